//! Static prompt sources for the three pipelines.
//!
//! Template documents live under `prompts/` and are embedded at compile time;
//! they are versioned configuration, not user input. The diary few-shot turns
//! are literal conversation data — the model is steered primarily by example
//! rather than by instruction, so they must stay byte-for-byte stable.

use crate::template::{PromptSpec, Role};

/// Planner system instructions: decompose into a bare JSON array.
pub const TASK_SYSTEM: &str = include_str!("../prompts/task_system.txt");
/// Planner human template. Variables: `{prompt}`.
pub const TASK_HUMAN: &str = include_str!("../prompts/task_user.txt");

/// Diary system instructions. Variables: `{pos_cnt}`, `{neg_cnt}`.
pub const DIARY_SYSTEM: &str = include_str!("../prompts/diary_system.txt");
/// Diary human template. Variables: `{diary}`.
pub const DIARY_HUMAN: &str = include_str!("../prompts/diary_user.txt");

/// Reviewer human template. Variables: `{tasks}`.
pub const REVIEW_HUMAN: &str = include_str!("../prompts/review_user.txt");

/// Fixed few-shot turns demonstrating the diary output schema.
pub const DIARY_EXAMPLES: &[(Role, &str)] = &[
    (
        Role::User,
        "日记内容：今天阳光明媚，我完成了所有任务，感觉很满足。",
    ),
    (
        Role::Assistant,
        r#"{"mood":"positive","emoji":"😀","keywords":["阳光","满足","成就","愉快"],"suggestions":["保持积极心态","奖励自己","分享喜悦"]}"#,
    ),
    (
        Role::User,
        "日记内容：今天被老板批评，工作进度很慢，感到沮丧和压力。",
    ),
    (
        Role::Assistant,
        r#"{"mood":"negative","emoji":"😞","keywords":["批评","沮丧","压力","情绪低落"],"suggestions":["深呼吸放松","设定可行目标","与朋友倾诉"]}"#,
    ),
];

/// Prompt for the task-planning pipeline.
pub fn task_planning() -> PromptSpec {
    PromptSpec::new(TASK_HUMAN).with_system(TASK_SYSTEM)
}

/// Prompt for the diary-analysis pipeline.
pub fn diary_analysis() -> PromptSpec {
    PromptSpec::new(DIARY_HUMAN)
        .with_system(DIARY_SYSTEM)
        .with_examples(DIARY_EXAMPLES)
}

/// Prompt for the task-review pipeline.
pub fn task_review() -> PromptSpec {
    PromptSpec::new(REVIEW_HUMAN)
}
