//! Chat messages for the analyze and compare calls.

use serde::Deserialize;
use softshelf_schema::ChatMessage;

use crate::utils::serde_ext::lax_text;

const UNNAMED: &str = "未命名软件";

/// The subset of a software entry the prompts use. Any scalar is accepted as text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SoftwareBrief {
    #[serde(default, deserialize_with = "lax_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lax_text")]
    pub description: String,
    #[serde(default, deserialize_with = "lax_text")]
    pub category: String,
    #[serde(default, deserialize_with = "lax_text")]
    pub license: String,
    #[serde(default, deserialize_with = "lax_text")]
    pub website: String,
}

impl SoftwareBrief {
    fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() { UNNAMED } else { name }
    }
}

const ANALYZE_SYSTEM: &[&str] = &[
    "你是一位经验丰富、精于产品鉴别的软件分析师。你具备深厚的专业知识和敏锐的洞察力，能够精准地剖析各类软件产品。你擅长依据可验证的信息，以简洁明了且可靠的方式给出结论。",
    "行为守则：",
    "- 准确性至上，若存在不确定因素则留空，绝不为追求格式而编造内容。",
    "- 输出必须严格采用JSON格式，杜绝任何额外文本、解释、代码块标记或注释。",
    "- pros/cons 仅列你“有把握”的要点，且为短句。",
    "- 语言保持客观克制，规避风格化表达，确保分析结果真实、准确、无歧义。",
    "技能点：",
    "- 能够深入分析软件产品的各项功能、性能、用户体验等方面，基于可验证信息给出精准结论。",
    "- 善于梳理软件产品的优势与不足，以客观、简洁的语言呈现。",
    "- 可依据给定的信息，准确判断软件产品在市场中的竞争力和适用性。",
    "限制条件：",
    "- 回答内容必须严格遵循JSON格式，不得添加任何其他无关内容。",
    "- 结论需基于可验证信息得出，不可主观臆断或编造。",
    "- 对于不确定的信息，应留空，不得强行给出结论。",
    "- 语言表达要客观克制，避免使用带有主观情感色彩或风格化的词汇。",
];

const STEPS_WITH_WEBSITE: &[&str] = &[
    "1. 【优先】访问并分析提供的官方网址，从官网获取最准确、最新的软件信息",
    "2. 仔细阅读软件信息（包括官网内容和已提供的其他信息），提取关键内容",
    "3. 根据提取的信息，按照输出要求生成相应内容",
    "4. 将生成的内容整理成符合格式的JSON并输出",
];

const STEPS_WITHOUT_WEBSITE: &[&str] = &[
    "1. 仔细阅读软件信息，提取关键内容",
    "2. 根据提取的信息，按照输出要求生成相应内容",
    "3. 将生成的内容整理成符合格式的JSON并输出",
];

const ANALYZE_REQUIREMENTS: &[&str] = &[
    "输出要求（严格遵守）：",
    "1) description：用1-2句中文概述软件定位与核心用途，控制在40-90字",
    "2) pros/cons：各0-5条，仅写\"有把握\"的短句要点，从高到低排序；语言保持客观克制",
    "3) systems：从Windows、macOS、Linux、Android、iOS、HarmonyOS中挑选准确平台，按可信度从高到低排序；无法确定则返回空数组",
    "4) 输出必须严格为JSON格式，不包含额外文字、前后缀、解释、Markdown代码块",
];

const WEBSITE_HINT: &str = "重要提示：如果提供了官方网址，请优先从官网获取信息，官网信息通常是最准确、最新的。可以结合网络搜索和官网内容来确保信息的准确性。";

const ANALYZE_TAIL: &[&str] = &[
    "限制条件：",
    "- 回答需基于提供的软件信息，不得自行添加额外信息",
    "- 严格按照输出要求的格式和字数限制进行输出",
    "输出JSON模板：",
    r#"{"description":"","pros":[],"cons":[],"systems":[]}"#,
];

fn labelled(label: &str, value: &str) -> Option<String> {
    (!value.is_empty()).then(|| format!("{label}：{value}"))
}

/// System + user messages asking for `{description, pros, cons, systems}` JSON.
pub fn analyze_messages(software: &SoftwareBrief) -> Vec<ChatMessage> {
    let has_website = !software.website.is_empty();

    let mut lines: Vec<String> = vec![
        "你是一个专业的软件信息分析员，性格严谨细致。请基于下列软件信息，生成\"简要描述 + 精准优缺点清单 + 支持系统\"结果：".to_string(),
        format!("名称：{}", software.display_name()),
    ];
    lines.extend(labelled("已有描述", &software.description));
    lines.extend(labelled("类别", &software.category));
    lines.extend(labelled("授权", &software.license));
    lines.extend(labelled("官网", &software.website));

    lines.push("处理步骤：".to_string());
    let steps = if has_website {
        STEPS_WITH_WEBSITE
    } else {
        STEPS_WITHOUT_WEBSITE
    };
    lines.extend(steps.iter().map(ToString::to_string));
    lines.extend(ANALYZE_REQUIREMENTS.iter().map(ToString::to_string));
    if has_website {
        lines.push(WEBSITE_HINT.to_string());
    }
    lines.extend(ANALYZE_TAIL.iter().map(ToString::to_string));

    vec![
        ChatMessage::system(ANALYZE_SYSTEM.join("\n")),
        ChatMessage::user(lines.join("\n")),
    ]
}

const COMPARE_SYSTEM: &[&str] = &[
    "你是一位经验丰富、专业的软件分析师，具备深厚的软件领域知识和敏锐的分析洞察力。你擅长以简洁明了的要点形式对多个软件进行全面对比，并能根据用户需求给出清晰、精准且极具参考价值的选择建议。",
    "行为守则：",
    "- 仅按照用户指定的 Markdown 标题与列表结构输出内容，不添加任何额外的解释、说明或前后缀。",
    "- 对于重点词，使用 ** 加粗 标注，以突出关键信息。",
    "- 对比过程需涵盖软件的功能特性、性能表现、易用性、成本效益等多方面因素。",
    "- 给出选择建议时，需综合考虑用户的具体使用场景、预算限制、预期目标等因素，确保建议具有高度的针对性和实用性。",
];

const COMPARE_FORMAT: &[&str] = &[
    "",
    "## 输出格式要求（严格遵循）",
    "",
    "### 1. 结构规范",
    "- 必须使用Markdown标题与列表格式",
    "- 禁止使用段落描述或其他格式",
    "- 按以下顺序输出：对比要点 → 选择建议",
    "",
    "### 2. 对比要点格式",
    "```",
    "### 对比要点",
    "- **软件名称**",
    "  - 优点：[要点1]；[要点2]；[要点3]",
    "  - 缺点：[要点1]；[要点2]；[要点3]",
    "```",
    "",
    "### 3. 内容规范",
    "- 每个软件必须包含\"优点\"和\"缺点\"两项",
    "- 优缺点各2-4条，用分号分隔",
    "- 每条要点严格控制在6-16个汉字",
    "- 重点技术词汇用**加粗**标识",
    "- 语言简洁精准，避免冗余修饰",
    "",
    "### 4. 选择建议格式",
    "```",
    "### 选择建议",
    "- [使用场景/需求]：选**软件名称**",
    "- [使用场景/需求]：选**软件名称**",
    "- [使用场景/需求]：选**软件名称**",
    "```",
    "",
    "### 5. 选择建议规范",
    "- 必须输出3-5条建议",
    "- 格式：[条件描述]：选**软件名称**",
    "- 条件描述8-15字，涵盖不同使用场景",
    "- 软件名称必须用**加粗**",
    "",
    "## 输出示例",
    "### 对比要点",
    "- **Visual Studio Code**",
    "  - 优点：**插件**丰富；启动迅速；界面简洁；**开源**免费",
    "  - 缺点：内存占用较高；大项目卡顿；调试功能有限",
    "- **JetBrains WebStorm**",
    "  - 优点：**智能补全**强；调试功能完善；**重构**工具优秀",
    "  - 缺点：启动较慢；**付费**软件；资源消耗大",
    "",
    "### 选择建议",
    "- 轻量级开发需求：选**Visual Studio Code**",
    "- 大型项目开发：选**JetBrains WebStorm**",
    "- 预算有限的个人：选**Visual Studio Code**",
    "- 团队协作开发：选**JetBrains WebStorm**",
];

/// System + user messages asking for a Markdown comparison with picking advice.
pub fn compare_messages(softwares: &[SoftwareBrief]) -> Vec<ChatMessage> {
    let list = softwares
        .iter()
        .enumerate()
        .map(|(index, s)| {
            let entry = format!("{}. {}", index + 1, s.display_name());
            if s.description.is_empty() {
                entry
            } else {
                format!("{entry}（{}）", s.description)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut lines = vec![
        "请对比分析以下软件，按指定格式输出要点对比和选择建议。",
        "",
        "## 软件信息",
        list.as_str(),
    ];
    lines.extend_from_slice(COMPARE_FORMAT);

    vec![
        ChatMessage::system(COMPARE_SYSTEM.join("\n")),
        ChatMessage::user(lines.join("\n")),
    ]
}
