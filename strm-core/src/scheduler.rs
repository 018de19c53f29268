//! Hẹn giờ trên một luồng: trình duyệt dùng `setTimeout`, kiểm thử dùng đồng hồ ảo.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

pub type Task = Box<dyn FnOnce()>;

pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Task) -> Result<TimerId, ClientError>;
    /// Hủy một task chưa chạy. Id đã chạy hoặc không tồn tại thì bỏ qua.
    fn cancel(&self, id: TimerId);
}

/// Hai pha: chờ `visible` rồi gọi `on_fade`, chờ thêm `fade` rồi gọi `on_done`.
pub fn fade_then<F, D>(
    scheduler: &Rc<dyn Scheduler>,
    visible: Duration,
    fade: Duration,
    on_fade: F,
    on_done: D,
) -> Result<TimerId, ClientError>
where
    F: FnOnce() + 'static,
    D: FnOnce() + 'static,
{
    let follow_up = Rc::clone(scheduler);
    scheduler.schedule(
        visible,
        Box::new(move || {
            on_fade();
            if let Err(err) = follow_up.schedule(fade, Box::new(on_done)) {
                log::error!("Không hẹn được pha ẩn: {err}");
            }
        }),
    )
}

struct Pending {
    id: TimerId,
    due: Duration,
    task: Task,
}

/// Đồng hồ ảo tất định; `advance` chạy các task đến hạn theo thứ tự thời điểm.
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    queue: RefCell<Vec<Pending>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn advance_ms(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        while let Some(next) = self.pop_due(target) {
            self.now.set(next.due);
            (next.task)();
        }
        self.now.set(target);
    }

    fn pop_due(&self, target: Duration) -> Option<Pending> {
        let mut queue = self.queue.borrow_mut();
        let index = queue
            .iter()
            .enumerate()
            .filter(|(_, pending)| pending.due <= target)
            .min_by_key(|(_, pending)| (pending.due, pending.id))
            .map(|(index, _)| index)?;
        Some(queue.swap_remove(index))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> Result<TimerId, ClientError> {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.queue.borrow_mut().push(Pending {
            id,
            due: self.now.get() + delay,
            task,
        });
        Ok(id)
    }

    fn cancel(&self, id: TimerId) {
        self.queue.borrow_mut().retain(|pending| pending.id != id);
    }
}
