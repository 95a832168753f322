use glam::Vec2;
use lifegrid_kernel::{GridSimulation, TickDriver};
use std::str::FromStr;

/// A high-level action produced by whatever input layer the host has.
///
/// The kernel consumes actions, never raw device events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Force the cell under a world-space point alive or dead.
    Paint { position: Vec2, alive: bool },
    /// Flip the tick driver between running and paused.
    TogglePause,
    /// Kill every cell.
    Clear,
    /// No-op (used for input mapping that hasn't been bound yet).
    Noop,
}

/// Pointer buttons that paint cells while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Paints live cells.
    Primary,
    /// Paints dead cells.
    Secondary,
}

impl Action {
    /// Action for a held pointer button at a world-space position.
    pub fn from_pointer(button: PointerButton, position: Vec2) -> Self {
        Action::Paint {
            position,
            alive: button == PointerButton::Primary,
        }
    }
}

/// Errors from parsing a textual action.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseActionError {
    #[error("empty action")]
    Empty,
    #[error("unknown action `{0}`")]
    UnknownAction(String),
    #[error("`{verb}` expects {expected} arguments, got {got}")]
    WrongArity {
        verb: String,
        expected: usize,
        got: usize,
    },
    #[error("invalid coordinate `{0}`")]
    BadCoordinate(String),
}

impl FromStr for Action {
    type Err = ParseActionError;

    /// Accepts `paint X Y`, `erase X Y`, `pause`, `clear` and `noop`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let verb = parts
            .next()
            .ok_or(ParseActionError::Empty)?
            .to_ascii_lowercase();
        let args: Vec<&str> = parts.collect();

        let arity = |expected: usize| {
            if args.len() == expected {
                Ok(())
            } else {
                Err(ParseActionError::WrongArity {
                    verb: verb.clone(),
                    expected,
                    got: args.len(),
                })
            }
        };

        match verb.as_str() {
            "paint" | "erase" => {
                arity(2)?;
                let position = Vec2::new(parse_coord(args[0])?, parse_coord(args[1])?);
                Ok(Action::Paint {
                    position,
                    alive: verb == "paint",
                })
            }
            "pause" => arity(0).map(|_| Action::TogglePause),
            "clear" => arity(0).map(|_| Action::Clear),
            "noop" => arity(0).map(|_| Action::Noop),
            _ => Err(ParseActionError::UnknownAction(verb.clone())),
        }
    }
}

fn parse_coord(text: &str) -> Result<f32, ParseActionError> {
    text.parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseActionError::BadCoordinate(text.to_string()))
}

/// Route an action to the simulation or the driver.
///
/// Returns the grid id touched by a paint.
pub fn dispatch(
    action: Action,
    sim: &mut GridSimulation,
    driver: &mut TickDriver,
) -> Option<usize> {
    tracing::trace!(?action, "dispatching action");
    match action {
        Action::Paint { position, alive } => Some(sim.set_cell(position, alive)),
        Action::TogglePause => {
            driver.toggle_pause();
            None
        }
        Action::Clear => {
            sim.clear();
            None
        }
        Action::Noop => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifegrid_kernel::GridGeometry;

    fn setup() -> (GridSimulation, TickDriver) {
        let geometry = GridGeometry::new(Vec2::ZERO, Vec2::splat(4.0), 1.0).unwrap();
        (GridSimulation::new(geometry), TickDriver::new(0.1).unwrap())
    }

    #[test]
    fn parse_paint_and_erase() {
        assert_eq!(
            "paint 1.5 -2".parse::<Action>().unwrap(),
            Action::Paint {
                position: Vec2::new(1.5, -2.0),
                alive: true,
            }
        );
        assert_eq!(
            "  ERASE 0 0 ".parse::<Action>().unwrap(),
            Action::Paint {
                position: Vec2::ZERO,
                alive: false,
            }
        );
    }

    #[test]
    fn parse_simple_verbs() {
        assert_eq!("pause".parse::<Action>().unwrap(), Action::TogglePause);
        assert_eq!("clear".parse::<Action>().unwrap(), Action::Clear);
        assert_eq!("noop".parse::<Action>().unwrap(), Action::Noop);
    }

    #[test]
    fn parse_errors() {
        assert_eq!("".parse::<Action>().unwrap_err(), ParseActionError::Empty);
        assert!(matches!(
            "jump".parse::<Action>().unwrap_err(),
            ParseActionError::UnknownAction(_)
        ));
        assert_eq!(
            "paint 1".parse::<Action>().unwrap_err(),
            ParseActionError::WrongArity {
                verb: "paint".into(),
                expected: 2,
                got: 1,
            }
        );
        assert!(matches!(
            "pause now".parse::<Action>().unwrap_err(),
            ParseActionError::WrongArity { expected: 0, .. }
        ));
        assert_eq!(
            "paint x 1".parse::<Action>().unwrap_err(),
            ParseActionError::BadCoordinate("x".into())
        );
        assert!("paint NaN 1".parse::<Action>().is_err());
    }

    #[test]
    fn pointer_buttons_map_to_paint_state() {
        let p = Vec2::new(1.0, 1.0);
        assert_eq!(
            Action::from_pointer(PointerButton::Primary, p),
            Action::Paint {
                position: p,
                alive: true,
            }
        );
        assert_eq!(
            Action::from_pointer(PointerButton::Secondary, p),
            Action::Paint {
                position: p,
                alive: false,
            }
        );
    }

    #[test]
    fn dispatch_paint_sets_cell() {
        let (mut sim, mut driver) = setup();
        let id = dispatch(
            Action::Paint {
                position: Vec2::new(0.5, 0.5),
                alive: true,
            },
            &mut sim,
            &mut driver,
        )
        .unwrap();
        assert!(sim.is_alive(id));
    }

    #[test]
    fn dispatch_pause_toggles_driver() {
        let (mut sim, mut driver) = setup();
        assert_eq!(dispatch(Action::TogglePause, &mut sim, &mut driver), None);
        assert!(driver.is_paused());
        dispatch(Action::TogglePause, &mut sim, &mut driver);
        assert!(!driver.is_paused());
    }

    #[test]
    fn dispatch_clear_and_noop() {
        let (mut sim, mut driver) = setup();
        sim.set_cell(Vec2::ZERO, true);
        dispatch(Action::Noop, &mut sim, &mut driver);
        assert_eq!(sim.population(), 1);
        dispatch(Action::Clear, &mut sim, &mut driver);
        assert_eq!(sim.population(), 0);
    }
}
