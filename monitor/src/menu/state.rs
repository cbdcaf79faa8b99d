//! Latest snapshot per platform and the menu derived from them

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::menu::descriptor::MenuDescriptor;
use crate::menu::reconcile::reconcile;
use crate::models::deploy::{DeployRecord, Platform, PollSnapshot};
use crate::tray::presenter::TrayPresenter;

#[derive(Default)]
struct Slots {
    render: Option<PollSnapshot>,
    vercel: Option<PollSnapshot>,
    last_active: Option<bool>,
}

/// Holds the latest snapshot of each platform and pushes a fresh menu to the
/// presenter on every update.
///
/// Both pollers call [`MenuState::apply`] from their own tasks; the slots and the
/// presenter call sit behind one mutex so rebuilds never interleave.
pub struct MenuState {
    slots: Mutex<Slots>,
    presenter: Arc<dyn TrayPresenter>,
}

impl MenuState {
    pub fn new(presenter: Arc<dyn TrayPresenter>) -> Self {
        Self {
            slots: Mutex::new(Slots::default()),
            presenter,
        }
    }

    /// Replace the platform's slot with `snapshot`, reconcile against the other
    /// platform's latest snapshot and rebuild the presenter's menu.
    pub fn apply(&self, snapshot: PollSnapshot) -> MenuDescriptor {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());

        let slot = match snapshot.platform {
            Platform::Render => &mut slots.render,
            Platform::Vercel => &mut slots.vercel,
        };
        if let Some(current) = slot.as_ref() {
            if snapshot.polled_at < current.polled_at {
                debug!(
                    "Ignoring {} snapshot from {}, already showing {}",
                    snapshot.platform, snapshot.polled_at, current.polled_at
                );
                return reconcile_slots(&slots);
            }
        }

        debug!(
            "Applying {} snapshot from {} with {} deploy(s)",
            snapshot.platform,
            snapshot.polled_at,
            snapshot.len()
        );
        for deploy in &snapshot.deploys {
            debug!(
                "{} {} deploy {} by {}",
                deploy.platform,
                deploy.origin_name,
                deploy.deploy_id,
                deploy.creator.as_deref().unwrap_or("unknown")
            );
        }
        *slot = Some(snapshot);

        let render = deploys(&slots.render);
        let vercel = deploys(&slots.vercel);
        let menu = reconcile(render, vercel);

        if slots.last_active != Some(menu.has_active_deploys) {
            info!(
                "Active deploys: {} (Render {}, Vercel {})",
                if menu.has_active_deploys { "yes" } else { "none" },
                render.len(),
                vercel.len()
            );
            slots.last_active = Some(menu.has_active_deploys);
        }

        self.presenter.rebuild_menu(&menu);
        menu
    }

    /// The latest snapshot received for `platform`
    pub fn latest(&self, platform: Platform) -> Option<PollSnapshot> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        match platform {
            Platform::Render => slots.render.clone(),
            Platform::Vercel => slots.vercel.clone(),
        }
    }

    /// The menu for the current slots, without notifying the presenter
    pub fn current_menu(&self) -> MenuDescriptor {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        reconcile_slots(&slots)
    }
}

fn deploys(slot: &Option<PollSnapshot>) -> &[DeployRecord] {
    slot.as_ref().map(|s| s.deploys.as_slice()).unwrap_or(&[])
}

fn reconcile_slots(slots: &Slots) -> MenuDescriptor {
    reconcile(deploys(&slots.render), deploys(&slots.vercel))
}
