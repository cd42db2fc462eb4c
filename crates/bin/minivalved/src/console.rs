//! Line-oriented command console.
//!
//! ```text
//! on | off | toggle       local command on the valve
//! remote on|off           on/off written by a remote party
//! on-time <tenths>        auto-off duration written by a remote party
//! status                  current state, on-time and network value
//! quit
//! ```

use std::str::FromStr;

use minivalve_adapter_virtual::{VirtualNetwork, VirtualValve};
use minivalve_app::ports::TimerService;
use minivalve_domain::attribute::{AttributeValue, AttributeWrite};
use minivalve_domain::error::ValveError;
use minivalve_domain::id::{AttributeId, ClusterId};
use minivalve_domain::status::ZclStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Set(bool),
    Toggle,
    Remote(bool),
    OnTime(u16),
    Status,
    Quit,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`{command}` expects {expected}")]
    BadArgument {
        command: &'static str,
        expected: &'static str,
    },
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Empty);
        };
        let arg = words.next();
        match head {
            "on" | "open" => Ok(Self::Set(true)),
            "off" | "close" => Ok(Self::Set(false)),
            "toggle" => Ok(Self::Toggle),
            "status" => Ok(Self::Status),
            "quit" | "exit" => Ok(Self::Quit),
            "remote" => match arg {
                Some("on") => Ok(Self::Remote(true)),
                Some("off") => Ok(Self::Remote(false)),
                _ => Err(CommandError::BadArgument {
                    command: "remote",
                    expected: "`on` or `off`",
                }),
            },
            "on-time" => arg
                .and_then(|v| v.parse().ok())
                .map(Self::OnTime)
                .ok_or(CommandError::BadArgument {
                    command: "on-time",
                    expected: "tenths of a second (0..=65535)",
                }),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Valve(#[from] ValveError),
    #[error("network refused write ({0})")]
    Network(ZclStatus),
}

/// Run one command and return the line to print.
///
/// # Errors
///
/// Returns [`ConsoleError`] when the valve or the network refuses the command.
pub fn execute<T: TimerService + 'static>(
    network: &VirtualNetwork<T>,
    valve: &VirtualValve<T>,
    command: Command,
) -> Result<String, ConsoleError> {
    match command {
        Command::Set(state) => valve.set_valve(state)?,
        Command::Toggle => valve.set_valve(!valve.state())?,
        Command::Remote(state) => network
            .remote_write(
                valve.endpoint(),
                AttributeWrite::new(
                    ClusterId::ON_OFF,
                    AttributeId::ON_OFF,
                    AttributeValue::Bool(state),
                ),
            )
            .map_err(ConsoleError::Network)?,
        Command::OnTime(tenths) => network
            .remote_write(
                valve.endpoint(),
                AttributeWrite::new(
                    ClusterId::ON_OFF,
                    AttributeId::ON_TIME,
                    AttributeValue::U16(tenths),
                ),
            )
            .map_err(ConsoleError::Network)?,
        Command::Status | Command::Quit => {}
    }
    Ok(status_line(network, valve))
}

fn status_line<T: TimerService + 'static>(network: &VirtualNetwork<T>, valve: &VirtualValve<T>) -> String {
    let mirrored = network
        .read_attribute(valve.endpoint(), ClusterId::ON_OFF, AttributeId::ON_OFF)
        .map_or_else(|status| status.name().to_string(), |value| value.to_string());
    format!(
        "endpoint {}: {} (on-time {}, network on/off {})",
        valve.endpoint(),
        valve.phase(),
        valve.on_time(),
        mirrored
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use minivalve_app::ports::{Deadline, TimerCallback, TimerError, TimerHandle};
    use minivalve_domain::id::EndpointId;
    use minivalve_domain::valve::OnTime;

    /// Timer service that never fires.
    struct Frozen;

    impl TimerService for Frozen {
        fn schedule_once(
            &self,
            _duration: Duration,
            _callback: TimerCallback,
        ) -> Result<Deadline, TimerError> {
            Ok(Deadline {
                handle: TimerHandle::new(1),
                generation: 0,
            })
        }

        fn reschedule(
            &self,
            handle: TimerHandle,
            _duration: Duration,
        ) -> Result<Deadline, TimerError> {
            Ok(Deadline {
                handle,
                generation: 0,
            })
        }

        fn cancel(&self, _handle: TimerHandle) {}
    }

    fn setup() -> (VirtualNetwork<Frozen>, Arc<VirtualValve<Frozen>>) {
        let network = VirtualNetwork::default();
        let valve = network
            .add_valve(EndpointId::DEFAULT, OnTime::DEFAULT, Frozen)
            .unwrap();
        (network, valve)
    }

    #[test]
    fn should_parse_commands() {
        assert_eq!("on".parse(), Ok(Command::Set(true)));
        assert_eq!("  close ".parse(), Ok(Command::Set(false)));
        assert_eq!("remote off".parse(), Ok(Command::Remote(false)));
        assert_eq!("on-time 50".parse(), Ok(Command::OnTime(50)));
        assert_eq!("exit".parse(), Ok(Command::Quit));
    }

    #[test]
    fn should_reject_malformed_commands() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "flood".parse::<Command>(),
            Err(CommandError::Unknown("flood".to_string()))
        );
        assert!(matches!(
            "on-time 70000".parse::<Command>(),
            Err(CommandError::BadArgument { .. })
        ));
        assert!(matches!(
            "remote maybe".parse::<Command>(),
            Err(CommandError::BadArgument { .. })
        ));
    }

    #[test]
    fn should_open_and_report_status() {
        let (network, valve) = setup();
        let line = execute(&network, &valve, Command::Set(true)).unwrap();
        assert_eq!(
            line,
            "endpoint 10: on (timed) (on-time 360.0s, network on/off true)"
        );
    }

    #[test]
    fn should_toggle() {
        let (network, valve) = setup();
        execute(&network, &valve, Command::Toggle).unwrap();
        assert!(valve.state());
        execute(&network, &valve, Command::Toggle).unwrap();
        assert!(!valve.state());
    }

    #[test]
    fn should_route_on_time_through_network() {
        let (network, valve) = setup();
        execute(&network, &valve, Command::OnTime(0)).unwrap();
        assert_eq!(valve.on_time(), OnTime::DISABLED);
        assert_eq!(
            network.read_attribute(EndpointId::DEFAULT, ClusterId::ON_OFF, AttributeId::ON_TIME),
            Ok(AttributeValue::U16(0))
        );
    }

    #[test]
    fn should_apply_remote_on_off() {
        let (network, valve) = setup();
        let line = execute(&network, &valve, Command::Remote(true)).unwrap();
        assert!(valve.state());
        assert!(line.ends_with("network on/off true)"));
    }

    #[test]
    fn should_report_network_rejection() {
        let (network, valve) = setup();
        network
            .store()
            .reject_writes(EndpointId::DEFAULT, Some(ZclStatus::ReadOnly));
        let result = execute(&network, &valve, Command::Set(true));
        assert!(matches!(
            result,
            Err(ConsoleError::Valve(ValveError::NetworkWriteRejected(
                ZclStatus::ReadOnly
            )))
        ));
    }
}
