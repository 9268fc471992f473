//! # context：调用作用域内的选择器栈
//!
//! ## 核心意图（Why）
//! - 路由器需要知道“当前这次调用”要访问哪个分区，但业务代码不希望把分区号逐层传给每个读写方法；
//! - 嵌套调用可以临时覆盖外层选择器，退出后恢复外层，而不是直接清空。
//!
//! ## 行为契约（What）
//! - [`SelectorStack`] 是显式的上下文值，由一次逻辑调用独占并按引用向下传递；
//!   它不是线程局部变量，因此在任务被调度到不同线程、或一个线程服务多个调用时都不会串扰；
//! - [`SelectorStack::pop_or_clear`] 在剩余多于一个条目时只弹出一个，否则整体清空；
//! - [`SelectorScope`] 在 `Drop` 中执行 `pop_or_clear`，`?` 提前返回与 panic 展开路径同样生效。
//!
//! ## 风险提示（Trade-offs）
//! - 手工 `push` 而不配对 `pop_or_clear` 会让选择器在同一上下文值内残留，优先使用 [`SelectorStack::enter`]。

use core::fmt;
use core::ops::{Deref, DerefMut};

/// 一次逻辑调用的选择器栈。
#[derive(Clone, PartialEq, Eq)]
pub struct SelectorStack<S> {
    entries: Vec<S>,
}

impl<S> SelectorStack<S> {
    /// 创建空栈。
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// 压入选择器，遮蔽当前生效的值。
    pub fn push(&mut self, selector: S) {
        self.entries.push(selector);
    }

    /// 当前生效的选择器；空栈返回 `None`。
    pub fn peek(&self) -> Option<&S> {
        self.entries.last()
    }

    /// 剩余多于一个条目时弹出栈顶，否则清空整个栈。
    pub fn pop_or_clear(&mut self) {
        if self.entries.len() > 1 {
            self.entries.pop();
        } else {
            self.entries.clear();
        }
    }

    /// 栈深度。
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// 是否没有生效的选择器。
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 压入选择器并返回作用域守卫，守卫析构时执行 [`Self::pop_or_clear`]。
    pub fn enter(&mut self, selector: S) -> SelectorScope<'_, S> {
        self.push(selector);
        SelectorScope { stack: self }
    }
}

impl<S> Default for SelectorStack<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: fmt::Debug> fmt::Debug for SelectorStack<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter().rev()).finish()
    }
}

/// [`SelectorStack::enter`] 返回的作用域守卫。
///
/// - **契约 (What)**：解引用为被借用的栈，可继续向下传递或再次 `enter` 形成嵌套；
///   析构时恰好执行一次 `pop_or_clear`。
#[must_use = "dropping the scope immediately pops the selector"]
pub struct SelectorScope<'a, S> {
    stack: &'a mut SelectorStack<S>,
}

impl<S> Deref for SelectorScope<'_, S> {
    type Target = SelectorStack<S>;

    fn deref(&self) -> &Self::Target {
        self.stack
    }
}

impl<S> DerefMut for SelectorScope<'_, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.stack
    }
}

impl<S> Drop for SelectorScope<'_, S> {
    fn drop(&mut self) {
        self.stack.pop_or_clear();
    }
}

impl<S: fmt::Debug> fmt::Debug for SelectorScope<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SelectorScope").field(&self.stack).finish()
    }
}
