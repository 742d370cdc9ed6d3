//! 作答记录
//!
//! 题目 ID → 所选选项 ID，每道题最多一条，重复选择直接覆盖。
//! 这里不校验选项是否属于该题，无效 ID 在判分时自然不会匹配。

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct AnswerStore {
    selections: HashMap<i64, i64>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录或覆盖某题的选择
    pub fn select(&mut self, question_id: i64, answer_id: i64) {
        self.selections.insert(question_id, answer_id);
    }

    /// 某题当前的选择，未作答返回 None
    pub fn get(&self, question_id: i64) -> Option<i64> {
        self.selections.get(&question_id).copied()
    }

    /// 已作答题数
    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}
