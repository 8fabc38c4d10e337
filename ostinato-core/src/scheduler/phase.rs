//! Lifecycle state machine
//!
//! Every change of the runtime phase goes through [`Phase::transition`].

/// Lifecycle phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// No program active, selection menu shown
    Menu,
    /// Selected program is being instantiated
    Starting,
    /// Program instance is being ticked
    Running,
    /// Bindings are being released and the instance dropped
    Stopping,
}

/// Events driving lifecycle transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LifecycleEvent {
    /// User confirmed the selected program
    Confirm,
    /// Factory returned an instance
    Instantiated,
    /// Factory failed
    InstantiationFailed,
    /// Both buttons held past the long-press threshold
    ExitGesture,
    /// Program returned a fatal error from a tick
    TickFault,
    /// Bindings released, instance dropped, menu rendered
    TeardownComplete,
}

impl Phase {
    /// Check if a program instance may exist in this phase
    pub fn has_program(&self) -> bool {
        matches!(self, Phase::Running)
    }

    /// Check if the menu owns the inputs
    pub fn is_menu(&self) -> bool {
        matches!(self, Phase::Menu)
    }

    /// Process an event and return the next phase
    ///
    /// Events that mean nothing in the current phase leave it unchanged.
    pub fn transition(self, event: LifecycleEvent) -> Self {
        use LifecycleEvent::*;
        use Phase::*;

        match (self, event) {
            (Menu, Confirm) => Starting,

            (Starting, Instantiated) => Running,
            // A failed start goes through the same teardown as an exit
            (Starting, InstantiationFailed) => Stopping,

            (Running, ExitGesture) => Stopping,
            (Running, TickFault) => Stopping,

            (Stopping, TeardownComplete) => Menu,

            (state, _) => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_lifecycle() {
        let phase = Phase::Menu;
        let phase = phase.transition(LifecycleEvent::Confirm);
        assert_eq!(phase, Phase::Starting);
        let phase = phase.transition(LifecycleEvent::Instantiated);
        assert_eq!(phase, Phase::Running);
        let phase = phase.transition(LifecycleEvent::ExitGesture);
        assert_eq!(phase, Phase::Stopping);
        let phase = phase.transition(LifecycleEvent::TeardownComplete);
        assert_eq!(phase, Phase::Menu);
    }

    #[test]
    fn test_fault_stops() {
        assert_eq!(
            Phase::Running.transition(LifecycleEvent::TickFault),
            Phase::Stopping
        );
    }

    #[test]
    fn test_failed_start_reverts() {
        let phase = Phase::Starting.transition(LifecycleEvent::InstantiationFailed);
        assert_eq!(phase, Phase::Stopping);
        assert_eq!(
            phase.transition(LifecycleEvent::TeardownComplete),
            Phase::Menu
        );
    }

    #[test]
    fn test_ignored_events() {
        // Exit gesture in the menu does nothing
        assert_eq!(
            Phase::Menu.transition(LifecycleEvent::ExitGesture),
            Phase::Menu
        );
        // Confirm is only reachable from the menu
        assert_eq!(
            Phase::Running.transition(LifecycleEvent::Confirm),
            Phase::Running
        );
        assert_eq!(
            Phase::Stopping.transition(LifecycleEvent::Confirm),
            Phase::Stopping
        );
    }

    #[test]
    fn test_phase_queries() {
        assert!(Phase::Running.has_program());
        assert!(!Phase::Stopping.has_program());
        assert!(Phase::Menu.is_menu());
    }
}
