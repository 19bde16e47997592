//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.  Every `on_update` asks the schedule for the next
//! action and moves to the state that performs it.
//!
//! ```text
//!  IDLE ──[boot]──▶ CHECKING_IN ◀──[checkin due]──┐
//!                     │    ▲                       │
//!            [feed due]    └──[fed]──┐             │
//!                     ▼              │             │
//!                  FEEDING ──────────┘          WAITING
//!                     ▲                            │
//!                     └──────────[feed due]────────┘
//! ```

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use crate::schedule::Action;
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: None,
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1 — Feeding
        StateDescriptor {
            id: StateId::Feeding,
            name: "Feeding",
            on_enter: Some(feeding_enter),
            on_exit: None,
            on_update: feeding_update,
        },
        // Index 2 — CheckingIn
        StateDescriptor {
            id: StateId::CheckingIn,
            name: "CheckingIn",
            on_enter: Some(checking_in_enter),
            on_exit: None,
            on_update: checking_in_update,
        },
        // Index 3 — Waiting
        StateDescriptor {
            id: StateId::Waiting,
            name: "Waiting",
            on_enter: Some(waiting_enter),
            on_exit: None,
            on_update: waiting_update,
        },
    ]
}

/// The state that carries out `action`.
pub fn state_for(action: Action) -> StateId {
    match action {
        Action::Feed { .. } => StateId::Feeding,
        Action::CheckIn => StateId::CheckingIn,
        Action::Wait(_) => StateId::Waiting,
    }
}

fn route(ctx: &mut FsmContext, current: StateId) -> Option<StateId> {
    ctx.action = ctx.schedule.next_action();
    let next = state_for(ctx.action);
    (next != current).then_some(next)
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE: boot only, the first tick always leaves it
// ═══════════════════════════════════════════════════════════════════════════

fn idle_update(ctx: &mut FsmContext) -> Option<StateId> {
    route(ctx, StateId::Idle)
}

// ═══════════════════════════════════════════════════════════════════════════
//  FEEDING
// ═══════════════════════════════════════════════════════════════════════════

fn feeding_enter(ctx: &mut FsmContext) {
    if let Action::Feed { scoops } = ctx.action {
        info!("FEEDING: dispensing {} scoop(s)", scoops);
    }
}

fn feeding_update(ctx: &mut FsmContext) -> Option<StateId> {
    route(ctx, StateId::Feeding)
}

// ═══════════════════════════════════════════════════════════════════════════
//  CHECKING_IN
// ═══════════════════════════════════════════════════════════════════════════

fn checking_in_enter(ctx: &mut FsmContext) {
    info!(
        "CHECKING_IN: reporting {}",
        if ctx.schedule.has_fed() { "unacknowledged feeding" } else { "status" }
    );
}

fn checking_in_update(ctx: &mut FsmContext) -> Option<StateId> {
    route(ctx, StateId::CheckingIn)
}

// ═══════════════════════════════════════════════════════════════════════════
//  WAITING
// ═══════════════════════════════════════════════════════════════════════════

fn waiting_enter(ctx: &mut FsmContext) {
    info!(
        "WAITING: next check-in in {:?}, next feed in {:?}",
        ctx.schedule.time_to_next_checkin(),
        ctx.schedule.time_to_next_feed()
    );
}

fn waiting_update(ctx: &mut FsmContext) -> Option<StateId> {
    route(ctx, StateId::Waiting)
}
