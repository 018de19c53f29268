use std::cell::RefCell;

/// Kết quả lấy instance của trang.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Obtained<T> {
    /// Vừa dựng; caller phải khởi động nó.
    Fresh(T),
    /// Đã có từ lần `init` trước, listener và toast của nó vẫn sống.
    Existing(T),
}

impl<T> Obtained<T> {
    pub fn into_inner(self) -> T {
        match self {
            Obtained::Fresh(value) | Obtained::Existing(value) => value,
        }
    }
}

/// Ô chứa instance duy nhất của trang. Dựng tối đa một lần; gọi lại chỉ trả bản đã có.
pub struct InstanceSlot<T> {
    slot: RefCell<Option<T>>,
}

impl<T: Clone> Default for InstanceSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> InstanceSlot<T> {
    pub const fn new() -> Self {
        Self {
            slot: RefCell::new(None),
        }
    }

    pub fn get(&self) -> Option<T> {
        self.slot.borrow().clone()
    }

    /// `build` chạy khi chưa có instance; lỗi của nó không để lại gì trong ô.
    pub fn get_or_try_init<E, F>(&self, build: F) -> Result<Obtained<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(existing) = self.get() {
            return Ok(Obtained::Existing(existing));
        }
        let value = build()?;
        *self.slot.borrow_mut() = Some(value.clone());
        Ok(Obtained::Fresh(value))
    }
}
