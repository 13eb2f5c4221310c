// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{PanelCommand, PanelEvent, PanelState};

/// An invocable action registered with the host shell's palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellAction {
    pub id: &'static str,
    pub label: &'static str,
    pub caption: &'static str,
    pub category: &'static str,
}

/// The one action this crate contributes: create-or-reveal the reference
/// panel. Registered under a Help-style category.
pub const OPEN_REFERENCE_ACTION: ShellAction = ShellAction {
    id: "commands-reference:open",
    label: "Show Commands Reference",
    caption: "Open a searchable table of every registered command",
    category: "Help",
};

pub const SHELL_ACTIONS: [ShellAction; 1] = [OPEN_REFERENCE_ACTION];

/// Externally-owned singleton slot for the panel: at most one live
/// instance, re-creatable after disposal. Disposal clears the slot rather
/// than leaving a dangling handle behind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PanelSlot {
    instance: Option<PanelState>,
    attached: bool,
}

impl PanelSlot {
    pub fn instance(&self) -> Option<&PanelState> {
        self.instance.as_ref()
    }

    pub fn instance_mut(&mut self) -> Option<&mut PanelState> {
        self.instance.as_mut()
    }

    pub fn is_live(&self) -> bool {
        self.instance.is_some()
    }

    pub fn is_attached(&self) -> bool {
        self.attached && self.instance.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Home,
    Panel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellState {
    pub focus: Focus,
    pub slot: PanelSlot,
    pub status_line: Option<String>,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            focus: Focus::Home,
            slot: PanelSlot::default(),
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Invoke a registered action by id. Unknown ids report a status.
    InvokeAction(String),
    OpenReference,
    /// Hide the panel without disposing it; the instance stays live.
    DetachReference,
    /// Close the panel for good; the slot is cleared and a later open
    /// constructs a fresh instance.
    DisposeReference,
    Panel(PanelCommand),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    FocusChanged(Focus),
    PanelCreated,
    PanelAttached,
    PanelDisposed,
    Panel(PanelEvent),
    StatusUpdated(String),
    StatusCleared,
    UnknownAction(String),
}

impl ShellState {
    pub fn dispatch(&mut self, command: ShellCommand) -> Vec<ShellEvent> {
        match command {
            ShellCommand::InvokeAction(id) => {
                if id == OPEN_REFERENCE_ACTION.id {
                    self.dispatch(ShellCommand::OpenReference)
                } else {
                    vec![ShellEvent::UnknownAction(id)]
                }
            }
            ShellCommand::OpenReference => self.open_reference(),
            ShellCommand::DetachReference => {
                self.slot.attached = false;
                self.focus = Focus::Home;
                vec![ShellEvent::FocusChanged(self.focus)]
            }
            ShellCommand::DisposeReference => {
                self.slot.instance = None;
                self.slot.attached = false;
                self.focus = Focus::Home;
                vec![
                    ShellEvent::PanelDisposed,
                    ShellEvent::FocusChanged(self.focus),
                ]
            }
            ShellCommand::Panel(command) => {
                let Some(panel) = self.slot.instance_mut() else {
                    return Vec::new();
                };
                panel
                    .dispatch(command)
                    .into_iter()
                    .map(ShellEvent::Panel)
                    .collect()
            }
            ShellCommand::SetStatus(message) => {
                self.status_line = Some(message.clone());
                vec![ShellEvent::StatusUpdated(message)]
            }
            ShellCommand::ClearStatus => {
                self.status_line = None;
                vec![ShellEvent::StatusCleared]
            }
        }
    }

    /// Create-if-absent-or-disposed, attach-if-detached, always activate.
    fn open_reference(&mut self) -> Vec<ShellEvent> {
        let mut events = Vec::new();

        if self.slot.instance.is_none() {
            let mut panel = PanelState::default();
            events.push(ShellEvent::PanelCreated);
            events.extend(
                panel
                    .dispatch(PanelCommand::BeginLoad)
                    .into_iter()
                    .map(ShellEvent::Panel),
            );
            self.slot.instance = Some(panel);
        }

        if !self.slot.attached {
            self.slot.attached = true;
            events.push(ShellEvent::PanelAttached);
        }

        self.focus = Focus::Panel;
        events.push(ShellEvent::FocusChanged(self.focus));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Focus, OPEN_REFERENCE_ACTION, ShellCommand, ShellEvent, ShellState,
    };
    use crate::{PanelCommand, PanelEvent};

    #[test]
    fn first_open_creates_panel_and_requests_load() {
        let mut shell = ShellState::default();
        let events = shell.dispatch(ShellCommand::OpenReference);

        assert!(events.contains(&ShellEvent::PanelCreated));
        assert!(
            events.contains(&ShellEvent::Panel(PanelEvent::LoadRequested { cycle: 1 })),
            "a freshly created panel starts phase 1 immediately"
        );
        assert!(shell.slot.is_attached());
        assert_eq!(shell.focus, Focus::Panel);
    }

    #[test]
    fn reopening_a_live_panel_reuses_the_instance() {
        let mut shell = ShellState::default();
        shell.dispatch(ShellCommand::OpenReference);
        shell.dispatch(ShellCommand::DetachReference);
        assert!(shell.slot.is_live());
        assert!(!shell.slot.is_attached());

        let events = shell.dispatch(ShellCommand::OpenReference);
        assert!(!events.contains(&ShellEvent::PanelCreated));
        assert!(events.contains(&ShellEvent::PanelAttached));
        assert_eq!(shell.focus, Focus::Panel);

        // Reuse keeps the existing load cycle; no second enumeration.
        assert_eq!(shell.slot.instance().unwrap().cycle(), 1);
    }

    #[test]
    fn disposal_clears_the_slot_and_a_later_open_recreates() {
        let mut shell = ShellState::default();
        shell.dispatch(ShellCommand::OpenReference);
        let events = shell.dispatch(ShellCommand::DisposeReference);
        assert!(events.contains(&ShellEvent::PanelDisposed));
        assert!(!shell.slot.is_live());
        assert_eq!(shell.focus, Focus::Home);

        let events = shell.dispatch(ShellCommand::OpenReference);
        assert!(events.contains(&ShellEvent::PanelCreated));
        assert!(shell.slot.is_live());
    }

    #[test]
    fn invoke_action_routes_the_registered_id_and_flags_unknown_ids() {
        let mut shell = ShellState::default();
        let events = shell.dispatch(ShellCommand::InvokeAction(
            OPEN_REFERENCE_ACTION.id.to_owned(),
        ));
        assert!(events.contains(&ShellEvent::PanelCreated));

        let events = shell.dispatch(ShellCommand::InvokeAction("nope:nope".to_owned()));
        assert_eq!(
            events,
            vec![ShellEvent::UnknownAction("nope:nope".to_owned())]
        );
    }

    #[test]
    fn panel_commands_are_dropped_when_no_instance_exists() {
        let mut shell = ShellState::default();
        let events = shell.dispatch(ShellCommand::Panel(PanelCommand::Refresh));
        assert!(events.is_empty());
    }
}
