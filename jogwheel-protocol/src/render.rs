//! Command rendering for the Grbl line protocol.
//!
//! Line formats:
//! - Jog: `$J=G91[ X<mm>][ Y<mm>][ Z<mm>] F<feed>\n`
//! - Set work zero: `G10 L20 P0[ X0][ Y0][ Z0]\n`
//! - Home: `$H\n`
//! - Probe: `G38.2[ X<mm>][ Y<mm>][ Z<mm>] F<feed>\n`
//!
//! Distances are carried as integer micrometres and printed as millimetres
//! with exactly three fractional digits. Axes with a zero distance are left
//! out of the line entirely.

use core::fmt::{self, Write};

use heapless::String;

/// Maximum rendered line length including the terminating newline
pub const MAX_LINE_LEN: usize = 64;

/// A rendered, newline-terminated command line
pub type RenderedLine = String<MAX_LINE_LEN>;

/// Errors that can occur while rendering a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderError {
    /// The line does not fit in [`MAX_LINE_LEN`] bytes
    BufferTooSmall,
}

/// Incremental (G91) jog move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Jog {
    /// X distance in micrometres
    pub x_um: i32,
    /// Y distance in micrometres
    pub y_um: i32,
    /// Z distance in micrometres
    pub z_um: i32,
    /// Feed rate in mm/min
    pub feed: u16,
}

/// Commands understood by the motion controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MachineCommand {
    /// Jog relative to the current position
    Jog(Jog),
    /// Make the current position the work-coordinate zero of the selected axes
    SetZero { x: bool, y: bool, z: bool },
    /// Run the homing cycle
    Home,
    /// Straight probe towards the given relative target until contact
    Probe(Jog),
}

/// Signed micrometre value printed as millimetres with three decimals
struct Millimetres(i32);

impl fmt::Display for Millimetres {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:03}", sign, abs / 1000, abs % 1000)
    }
}

fn write_axes<W: Write>(out: &mut W, axes: &Jog) -> fmt::Result {
    for (letter, um) in [('X', axes.x_um), ('Y', axes.y_um), ('Z', axes.z_um)] {
        if um != 0 {
            write!(out, " {}{}", letter, Millimetres(um))?;
        }
    }
    Ok(())
}

impl MachineCommand {
    fn write_line<W: Write>(&self, out: &mut W) -> fmt::Result {
        match self {
            MachineCommand::Jog(jog) => {
                out.write_str("$J=G91")?;
                write_axes(out, jog)?;
                write!(out, " F{}", jog.feed)?;
            }
            MachineCommand::SetZero { x, y, z } => {
                out.write_str("G10 L20 P0")?;
                for (letter, selected) in [('X', *x), ('Y', *y), ('Z', *z)] {
                    if selected {
                        write!(out, " {}0", letter)?;
                    }
                }
            }
            MachineCommand::Home => out.write_str("$H")?,
            MachineCommand::Probe(target) => {
                out.write_str("G38.2")?;
                write_axes(out, target)?;
                write!(out, " F{}", target.feed)?;
            }
        }
        out.write_char('\n')
    }

    /// Render this command into a fixed-capacity string
    pub fn render(&self) -> Result<RenderedLine, RenderError> {
        let mut line = RenderedLine::new();
        self.write_line(&mut line)
            .map_err(|_| RenderError::BufferTooSmall)?;
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn jog(x_um: i32, y_um: i32, z_um: i32, feed: u16) -> MachineCommand {
        MachineCommand::Jog(Jog {
            x_um,
            y_um,
            z_um,
            feed,
        })
    }

    #[test]
    fn test_jog_omits_zero_axes() {
        let line = jog(0, 5500, 0, 100).render().unwrap();
        assert_eq!(line.as_str(), "$J=G91 Y5.500 F100\n");
    }

    #[test]
    fn test_jog_all_axes() {
        let line = jog(1, -20, 3000, 1000).render().unwrap();
        assert_eq!(line.as_str(), "$J=G91 X0.001 Y-0.020 Z3.000 F1000\n");
    }

    #[test]
    fn test_negative_sub_millimetre() {
        let line = jog(-250, 0, 0, 1000).render().unwrap();
        assert_eq!(line.as_str(), "$J=G91 X-0.250 F1000\n");
    }

    #[test]
    fn test_jog_without_distance_keeps_feed() {
        let line = jog(0, 0, 0, 300).render().unwrap();
        assert_eq!(line.as_str(), "$J=G91 F300\n");
    }

    #[test]
    fn test_set_zero() {
        let xy = MachineCommand::SetZero {
            x: true,
            y: true,
            z: false,
        };
        let z = MachineCommand::SetZero {
            x: false,
            y: false,
            z: true,
        };
        assert_eq!(xy.render().unwrap().as_str(), "G10 L20 P0 X0 Y0\n");
        assert_eq!(z.render().unwrap().as_str(), "G10 L20 P0 Z0\n");
    }

    #[test]
    fn test_home() {
        assert_eq!(MachineCommand::Home.render().unwrap().as_str(), "$H\n");
    }

    #[test]
    fn test_probe() {
        let probe = MachineCommand::Probe(Jog {
            z_um: -10_000,
            feed: 50,
            ..Jog::default()
        });
        assert_eq!(probe.render().unwrap().as_str(), "G38.2 Z-10.000 F50\n");
    }

    #[test]
    fn test_home_is_a_bare_line() {
        let line = MachineCommand::Home.render().unwrap();
        assert_eq!(line.len(), 3);
        assert_eq!(line.as_bytes(), b"$H\n");
    }

    #[test]
    fn test_widest_jog_fits_line() {
        let line = jog(i32::MIN, i32::MIN, i32::MIN, u16::MAX).render();
        assert!(line.is_ok());
    }

    proptest! {
        #[test]
        fn prop_axis_field_present_iff_nonzero(x in any::<i16>(), y in any::<i16>(), z in any::<i16>()) {
            let line = jog(x as i32, y as i32, z as i32, 500).render().unwrap();
            prop_assert_eq!(line.contains(" X"), x != 0);
            prop_assert_eq!(line.contains(" Y"), y != 0);
            prop_assert_eq!(line.contains(" Z"), z != 0);
            prop_assert!(line.ends_with(" F500\n"));
        }
    }
}
