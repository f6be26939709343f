//! Construcción del prompt que pide al LLM el mapa mental bilingüe.

use crate::text::truncate_chars;

/// Caracteres del documento que se envían al modelo. El recorte es silencioso.
pub const PROMPT_CHAR_BUDGET: usize = 3000;

pub const SYSTEM_PROMPT: &str = "你是一个专业的文档分析助手，擅长将文档内容组织成思维导图结构。请确保返回的JSON格式正确且完整，必须包含chinese和english两个字段。";

const INSTRUCTIONS: &str = r#"请分析以下文档内容，生成一个结构化的思维导图。

重要要求：
1. 每个节点的名称必须简洁，中文不超过8个字，英文不超过4个单词
2. 子节点名称要更加精炼，中文不超过6个字，英文不超过3个单词
3. 避免使用长句子或描述性文字，只使用关键词或短语
4. 需要生成中英文两个版本
5. **关键**：每个节点必须包含 "keywords" 字段，这非常重要！

关于 keywords 字段的要求：
- keywords 必须是从原文中**直接复制**的词语或短语
- 每个关键词应该是原文中实际存在的、连续的文本片段
- 选择最具代表性的2-5个关键词
- 关键词应该能在原文中被精确找到
- 例如：如果原文有"机器学习算法"，就用"机器学习"或"算法"作为关键词
- 不要创造新词，必须使用原文中的原话

思维导图应该以JSON格式返回，格式如下：
{
  "chinese": {
    "name": "文档主题",
    "keywords": ["原文中的词1", "原文中的词2"],
    "children": [
      {
        "name": "章节1",
        "keywords": ["原文中的关键句"],
        "children": [
          {"name": "要点1", "keywords": ["原文中的词"]},
          {"name": "要点2", "keywords": ["原文中的词"]}
        ]
      },
      {
        "name": "章节2",
        "keywords": ["原文关键词"],
        "children": [
          {"name": "要点3", "keywords": ["原文词语"]}
        ]
      }
    ]
  },
  "english": {
    "name": "Topic",
    "keywords": ["word from text", "phrase from text"],
    "children": [
      {
        "name": "Chapter 1",
        "keywords": ["exact text"],
        "children": [
          {"name": "Point 1", "keywords": ["from original"]},
          {"name": "Point 2", "keywords": ["from text"]}
        ]
      },
      {
        "name": "Chapter 2",
        "keywords": ["original word"],
        "children": [
          {"name": "Point 3", "keywords": ["text snippet"]}
        ]
      }
    ]
  }
}"#;

const CLOSING: &str = r#"请只返回JSON格式的思维导图数据，包含chinese和english两个字段。
**重要**：keywords 必须是从上面的文档内容中直接提取的原文片段，这样才能在原文中高亮显示！"#;

/// Prompt completo para `text`, recortado a `budget` caracteres.
pub fn build_prompt(text: &str, budget: usize) -> String {
    format!(
        "{INSTRUCTIONS}\n\n文档内容：\n{}\n\n{CLOSING}",
        truncate_chars(text, budget)
    )
}
