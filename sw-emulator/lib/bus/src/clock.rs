/*++

Licensed under the Apache-2.0 license.

File Name:

    clock.rs

Abstract:

    File contains Clock and Timer types, used to implement timer-based deferred
    execution for peripherals.

--*/
use std::{
    cell::{Cell, RefCell},
    collections::{BTreeSet, HashSet},
    ptr,
    rc::Rc,
};

use crate::Bus;

/// Peripherals that want timer-based deferred execution store a clone of
/// `Timer` inside themselves and use it to schedule future notification via
/// [`Bus::poll`].
#[derive(Clone)]
pub struct Timer {
    clock: Rc<ClockImpl>,
}
impl Timer {
    /// Constructs a new timer bound to the specified clock.
    pub fn new(clock: &Clock) -> Self {
        Self {
            clock: Rc::clone(&clock.clock),
        }
    }

    /// Returns the number of clock cycles that have elapsed since simulation
    /// start.
    #[inline]
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// If the scheduled time for `action` has come, `action` will be set to
    /// None and the function will return true. Otherwise (or if action is
    /// None), the function will return false.
    pub fn fired(&self, action: &mut Option<ActionHandle>) -> bool {
        let has_fired = if let Some(ref action) = action {
            debug_assert_eq!(
                action.0.id.timer_ptr,
                Rc::as_ptr(&self.clock),
                "Supplied action was not created by this timer."
            );
            self.clock.has_fired(action.0.time)
        } else {
            false
        };
        if has_fired {
            *action = None;
        }
        has_fired
    }

    /// Schedules a future call to [`Bus::poll()`] at `time`.
    pub fn schedule_poll_at(&self, time: u64) -> ActionHandle {
        self.clock.schedule_action_at(time, TimerAction::Poll)
    }

    /// Schedules a future call to [`Bus::poll()`] at `self.now() + ticks_from_now`.
    pub fn schedule_poll_in(&self, ticks_from_now: u64) -> ActionHandle {
        self.schedule_poll_at(self.now().wrapping_add(ticks_from_now))
    }

    /// Cancels a previously scheduled poll action.
    ///
    /// # Panics
    ///
    /// Panics if the supplied `ActionHandle` was not created by this Timer.
    pub fn cancel(&self, handle: ActionHandle) {
        self.clock.cancel(handle)
    }
}

pub struct Clock {
    clock: Rc<ClockImpl>,
}
impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
impl Clock {
    /// Constructs a new Clock with the cycle counter set to 0.
    pub fn new() -> Clock {
        Self {
            clock: ClockImpl::new(),
        }
    }

    /// Constructs a `Timer` associated with this clock.
    pub fn timer(&self) -> Timer {
        Timer::new(self)
    }

    /// Returns the number of simulated clock cycles that have elapsed since
    /// simulation start.
    #[inline]
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Increments the clock by `delta`, and returns the timer actions fired.
    #[inline]
    pub fn increment(&self, delta: u64) -> HashSet<TimerAction> {
        self.clock.increment(delta)
    }

    /// Increments the clock by `delta`, and polls the bus if any scheduled
    /// timer actions fired.
    #[inline]
    pub fn increment_and_process_timer_actions(
        &self,
        delta: u64,
        bus: &mut impl Bus,
    ) -> HashSet<TimerAction> {
        let fired_actions = self.increment(delta);
        for action in fired_actions.iter() {
            match action {
                TimerAction::Poll => bus.poll(),
            }
        }
        fired_actions
    }
}

/// Represents an action scheduled with a `Timer`. Returned by
/// [`Timer::schedule_poll_at`] and passed to [`Timer::fired`] or
/// [`Timer::cancel`].
pub struct ActionHandle(ActionHandleImpl);
impl From<ActionHandleImpl> for ActionHandle {
    fn from(val: ActionHandleImpl) -> Self {
        ActionHandle(val)
    }
}

/// The internal representation of `ActionHandle`. Kept separate to avoid
/// exposing the implementation-specific traits.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
struct ActionHandleImpl {
    /// The time the action is supposed to fire.
    time: u64,

    id: TimerActionId,

    action: TimerAction,
}
impl From<ActionHandle> for ActionHandleImpl {
    fn from(val: ActionHandle) -> Self {
        val.0
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
struct TimerActionId {
    /// Pointer to the ClockImpl this action is scheduled on, used for
    /// identification purposes only. Prevents ActionHandles from one clock
    /// from being mixed up with another clock's.
    timer_ptr: *const ClockImpl,

    /// An ID assigned by the ClockImpl
    id: u64,
}
impl Default for TimerActionId {
    fn default() -> Self {
        Self {
            timer_ptr: ptr::null(),
            id: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TimerAction {
    Poll,
}

struct ClockImpl {
    now: Cell<u64>,
    next_action_time: Cell<Option<u64>>,
    next_action_id: Cell<u64>,
    action_handles: RefCell<BTreeSet<ActionHandleImpl>>,
}
impl ClockImpl {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            now: Cell::new(0),
            next_action_time: Cell::new(None),
            next_action_id: Cell::new(0),
            action_handles: RefCell::new(BTreeSet::new()),
        })
    }

    #[inline]
    fn now(&self) -> u64 {
        self.now.get()
    }

    #[inline]
    fn increment(&self, delta: u64) -> HashSet<TimerAction> {
        let mut fired_actions: HashSet<TimerAction> = HashSet::new();
        assert!(
            delta < (u64::MAX >> 1),
            "Cannot increment the current time by more than {} clock cycles.",
            (u64::MAX >> 1)
        );
        self.now.set(self.now.get().wrapping_add(delta));
        if let Some(next_action_time) = self.next_action_time.get() {
            if self.has_fired(next_action_time) {
                self.remove_fired_actions(&mut fired_actions);
            }
        }
        fired_actions
    }

    fn schedule_action_at(self: &Rc<Self>, time: u64, action: TimerAction) -> ActionHandle {
        assert!(
            time.wrapping_sub(self.now()) < (u64::MAX >> 1),
            "Cannot schedule a timer action more than {} clock cycles from now.",
            (u64::MAX >> 1)
        );
        let new_action = ActionHandleImpl {
            time,
            id: self.next_action_id(),
            action,
        };
        let mut actions = self.action_handles.borrow_mut();
        actions.insert(new_action);
        self.recompute_next_action_time(&actions);
        new_action.into()
    }
    fn cancel(self: &Rc<Self>, action: ActionHandle) {
        let action = ActionHandleImpl::from(action);
        assert_eq!(
            Rc::as_ptr(self),
            action.id.timer_ptr,
            "Supplied action was not created by this timer."
        );
        let mut future_actions = self.action_handles.borrow_mut();
        future_actions.remove(&action);
        self.recompute_next_action_time(&future_actions)
    }
    fn next_action_id(self: &Rc<Self>) -> TimerActionId {
        let result = TimerActionId {
            timer_ptr: Rc::as_ptr(self),
            id: self.next_action_id.get(),
        };
        self.next_action_id
            .set(self.next_action_id.get().wrapping_add(1));
        result
    }
    fn has_fired(&self, action_time: u64) -> bool {
        self.now().wrapping_sub(action_time) < (u64::MAX >> 1)
    }
    fn recompute_next_action_time(&self, future_actions: &BTreeSet<ActionHandleImpl>) {
        self.next_action_time
            .set(self.find_next_action(future_actions).map(|a| a.time));
    }
    fn find_next_action<'a>(
        &self,
        future_actions: &'a BTreeSet<ActionHandleImpl>,
    ) -> Option<&'a ActionHandleImpl> {
        // Search from half the u64 range behind now, so entries scheduled
        // before a counter wraparound are still found.
        let search_start = self.now().wrapping_sub(u64::MAX >> 1);
        let search_action = ActionHandleImpl {
            time: search_start,
            id: TimerActionId::default(),
            action: TimerAction::Poll,
        };
        if let Some(action) = future_actions.range(&search_action..).next() {
            return Some(action);
        }
        future_actions.iter().next()
    }

    #[cold]
    fn remove_fired_actions(&self, fired_actions: &mut HashSet<TimerAction>) {
        let mut future_actions = self.action_handles.borrow_mut();
        while let Some(action) = self.find_next_action(&future_actions) {
            if !self.has_fired(action.time) {
                break;
            }
            let action = *action;
            future_actions.remove(&action);
            fired_actions.insert(action.action);
        }
        self.recompute_next_action_time(&future_actions);
    }
}
