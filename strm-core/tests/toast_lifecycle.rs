use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use strm_core::{
    ClientConfig, ClientError, Details, ManualScheduler, Notification, Scheduler, Severity,
    ToastId, ToastPhase, ToastSurface, Toaster,
};

#[derive(Default)]
struct FakeSurface {
    containers_created: Cell<usize>,
    mounted: RefCell<Vec<MountedToast>>,
    attached: RefCell<Vec<usize>>,
    fades: RefCell<Vec<usize>>,
    close_buttons: RefCell<Vec<Rc<dyn Fn()>>>,
    on_mount: RefCell<Option<Box<dyn Fn()>>>,
    refuse_mount: Cell<bool>,
}

#[derive(Debug, Clone)]
struct MountedToast {
    class: String,
    title: String,
    details: Vec<(String, String)>,
}

impl FakeSurface {
    fn click_close(&self, node: usize) {
        let button = Rc::clone(&self.close_buttons.borrow()[node]);
        button();
    }

    fn attached_count(&self) -> usize {
        self.attached.borrow().len()
    }
}

impl ToastSurface for FakeSurface {
    type Container = ();
    type Node = usize;

    fn obtain_container(&self) -> Result<(), ClientError> {
        self.containers_created.set(self.containers_created.get() + 1);
        Ok(())
    }

    fn mount(
        &self,
        _container: &(),
        notification: &Notification,
        on_close: Box<dyn Fn()>,
    ) -> Result<usize, ClientError> {
        if let Some(hook) = self.on_mount.borrow().as_ref() {
            hook();
        }
        if self.refuse_mount.get() {
            return Err(ClientError::Dom("mount bị từ chối".to_string()));
        }
        let mut mounted = self.mounted.borrow_mut();
        let node = mounted.len();
        mounted.push(MountedToast {
            class: notification.css_class(),
            title: notification.title.clone(),
            details: notification
                .details
                .as_ref()
                .map(|details| {
                    details
                        .iter()
                        .map(|(key, value)| (key.to_string(), value.to_string()))
                        .collect()
                })
                .unwrap_or_default(),
        });
        self.attached.borrow_mut().push(node);
        self.close_buttons.borrow_mut().push(Rc::from(on_close));
        Ok(node)
    }

    fn begin_fade(&self, node: &usize, _fade: Duration) {
        self.fades.borrow_mut().push(*node);
    }

    fn detach(&self, node: &usize) -> bool {
        let mut attached = self.attached.borrow_mut();
        let before = attached.len();
        attached.retain(|candidate| candidate != node);
        attached.len() != before
    }
}

fn toaster() -> (Toaster<FakeSurface>, Rc<ManualScheduler>) {
    let clock = Rc::new(ManualScheduler::new());
    let scheduler: Rc<dyn Scheduler> = clock.clone();
    let toaster = Toaster::new(
        FakeSurface::default(),
        scheduler,
        ClientConfig::default().toast_timing(),
    );
    (toaster, clock)
}

#[test]
fn success_toast_is_removed_after_auto_close_and_fade() {
    let (toaster, clock) = toaster();
    let surface = toaster.surface();

    let id = toaster
        .show(&Notification::new("Job done", "Export finished", Severity::Success))
        .expect("toast hiển thị được");

    assert_eq!(surface.containers_created.get(), 1);
    assert_eq!(surface.mounted.borrow()[0].class, "notification success");
    assert_eq!(toaster.phase(id), Some(ToastPhase::Visible));

    clock.advance_ms(9_999);
    assert_eq!(toaster.phase(id), Some(ToastPhase::Visible));

    clock.advance_ms(1);
    assert_eq!(toaster.phase(id), Some(ToastPhase::Fading));
    assert_eq!(surface.attached_count(), 1);

    clock.advance_ms(300);
    assert_eq!(toaster.phase(id), Some(ToastPhase::Removed));
    assert_eq!(surface.attached_count(), 0);
    assert_eq!(clock.pending(), 0);
}

#[test]
fn non_error_severities_auto_close_within_window() {
    for severity in [
        Severity::Info,
        Severity::Success,
        Severity::Warning,
        Severity::from("custom"),
    ] {
        let (toaster, clock) = toaster();
        let surface = toaster.surface();
        let id = toaster
            .show(&Notification::new("t", "m", severity.clone()))
            .expect("toast hiển thị được");
        clock.advance_ms(10_300);
        assert_eq!(toaster.phase(id), Some(ToastPhase::Removed), "{severity}");
        assert_eq!(surface.attached_count(), 0);
    }
}

#[test]
fn error_toast_stays_until_closed_manually() {
    let (toaster, clock) = toaster();
    let surface = toaster.surface();

    let id = toaster
        .show(&Notification::new("Error", "Disk full", Severity::Error))
        .expect("toast hiển thị được");

    clock.advance(Duration::from_secs(3_600));
    assert_eq!(toaster.phase(id), Some(ToastPhase::Visible));
    assert_eq!(clock.pending(), 0);

    surface.click_close(0);
    assert_eq!(toaster.phase(id), Some(ToastPhase::Fading));
    clock.advance_ms(300);
    assert_eq!(toaster.phase(id), Some(ToastPhase::Removed));
    assert_eq!(surface.attached_count(), 0);
}

#[test]
fn closing_twice_is_a_no_op() {
    let (toaster, clock) = toaster();
    let surface = toaster.surface();
    let id = toaster
        .show(&Notification::new("t", "m", Severity::Info))
        .expect("toast hiển thị được");

    assert!(toaster.close(id));
    assert!(!toaster.close(id));
    assert_eq!(surface.fades.borrow().len(), 1);

    clock.advance_ms(300);
    assert!(!toaster.close(id));
    surface.click_close(0);
    assert_eq!(surface.fades.borrow().len(), 1);
    assert_eq!(surface.attached_count(), 0);
}

#[test]
fn manual_close_cancels_pending_auto_close() {
    let (toaster, clock) = toaster();
    let id = toaster
        .show(&Notification::new("t", "m", Severity::Warning))
        .expect("toast hiển thị được");

    clock.advance_ms(1_000);
    assert!(toaster.close(id));
    clock.advance_ms(300);
    assert_eq!(clock.pending(), 0);
    assert_eq!(toaster.live_count(), 0);
}

#[test]
fn container_is_created_once_for_many_toasts() {
    let (toaster, _clock) = toaster();
    let surface = toaster.surface();
    for index in 0..5 {
        toaster
            .show(&Notification::new(format!("#{index}"), "m", Severity::Info))
            .expect("toast hiển thị được");
    }
    assert_eq!(surface.containers_created.get(), 1);
    assert_eq!(toaster.live_count(), 5);
}

#[test]
fn details_keep_insertion_order() {
    let (toaster, _clock) = toaster();
    let surface = toaster.surface();
    let details: Details = [("Zeta", "1"), ("Alpha", "2"), ("Mid", "3")]
        .into_iter()
        .collect();
    toaster
        .show(&Notification::new("Sync", "Done", Severity::Info).with_details(details))
        .expect("toast hiển thị được");

    let mounted = surface.mounted.borrow();
    let keys: Vec<&str> = mounted[0]
        .details
        .iter()
        .map(|(key, _)| key.as_str())
        .collect();
    assert_eq!(keys, ["Zeta", "Alpha", "Mid"]);
    assert_eq!(mounted[0].title, "Sync");
}

#[test]
fn unknown_severity_gets_plain_styling() {
    let spaced = Notification::new("t", "m", Severity::from("very bad"));
    assert_eq!(spaced.css_class(), "notification");
    assert!(spaced.auto_dismisses());

    let custom = Notification::new("t", "m", Severity::from("debug"));
    assert_eq!(custom.css_class(), "notification debug");
}

#[test]
fn phases_never_skip_fading() {
    assert_eq!(ToastPhase::Created.next(), Some(ToastPhase::Visible));
    assert_eq!(ToastPhase::Visible.next(), Some(ToastPhase::Fading));
    assert_eq!(ToastPhase::Fading.next(), Some(ToastPhase::Removed));
    assert_eq!(ToastPhase::Removed.next(), None);
}

#[test]
fn toast_is_created_before_it_becomes_visible() {
    let (toaster, _clock) = toaster();
    let seen = Rc::new(Cell::new(None));
    let observer = toaster.clone();
    let record = Rc::clone(&seen);
    *toaster.surface().on_mount.borrow_mut() =
        Some(Box::new(move || record.set(observer.phase(ToastId(0)))));

    let id = toaster
        .show(&Notification::new("t", "m", Severity::Info))
        .expect("toast hiển thị được");
    // Cắt vòng toaster -> surface -> hook -> toaster.
    toaster.surface().on_mount.borrow_mut().take();

    assert_eq!(id, ToastId(0));
    assert_eq!(seen.get(), Some(ToastPhase::Created));
    assert_eq!(toaster.phase(id), Some(ToastPhase::Visible));
}

#[test]
fn failed_mount_leaves_no_live_toast() {
    let (toaster, clock) = toaster();
    toaster.surface().refuse_mount.set(true);

    let result = toaster.show(&Notification::new("t", "m", Severity::Success));

    assert!(matches!(result, Err(ClientError::Dom(_))));
    assert_eq!(toaster.live_count(), 0);
    assert_eq!(toaster.phase(ToastId(0)), Some(ToastPhase::Removed));
    assert_eq!(clock.pending(), 0);
}
