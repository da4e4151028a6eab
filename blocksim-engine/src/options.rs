//! Diagram configuration.
//!
//! Options come from three layers with fixed precedence: explicit setter
//! calls win over command-line switches, which win over the defaults. The
//! command-line layer is the usual switch set of the surrounding simulator
//! program; the engine itself only consumes `name` and the debug flags, the
//! rest is validated here and carried for the host's plotting side.

use clap::Parser;
use thiserror::Error;

/// An option value that failed validation at construction time.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("tiles must be ROWSxCOLS, got `{0}`")]
    Tiles(String),

    #[error("unknown debug flag `{0}` (expected letters from `psd`)")]
    DebugFlag(char),
}

/// Diagram-level configuration.
#[derive(Clone, Debug, Parser, PartialEq)]
#[command(name = "blocksim", about = "Block-diagram simulation options")]
pub struct Options {
    /// Diagram name.
    #[arg(long, default_value = "main")]
    pub name: String,

    /// Disable graphical display.
    #[arg(long = "nographics", short = 'g', action = clap::ArgAction::SetFalse)]
    pub graphics: bool,

    /// Update graphics at each time step (forces graphics on).
    #[arg(long, short = 'a', action = clap::ArgAction::SetTrue)]
    pub animation: bool,

    /// Disable the progress display.
    #[arg(long = "noprogress", short = 'p', action = clap::ArgAction::SetFalse)]
    pub progress: bool,

    /// Debug flag string: `p` propagation, `s` state, `d` derivative.
    #[arg(long, short = 'd', default_value = "", value_name = "[psd]")]
    pub debug: String,

    /// Plotting backend for the host application.
    #[arg(long, short = 'b', default_value = "Qt5Agg", value_name = "BACKEND")]
    pub backend: String,

    /// Figure tile layout on the display.
    #[arg(long, short = 't', default_value = "3x4", value_name = "ROWSxCOLS")]
    pub tiles: String,
}

impl Default for Options {
    fn default() -> Self {
        Self::parse_from(["blocksim"])
    }
}

impl Options {
    /// Options with the command-line layer applied over the defaults.
    pub fn from_cli() -> Self {
        Self::parse()
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_graphics(mut self, graphics: bool) -> Self {
        self.graphics = graphics;
        self
    }

    pub fn with_animation(mut self, animation: bool) -> Self {
        self.animation = animation;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_debug(mut self, debug: &str) -> Self {
        self.debug = debug.to_string();
        self
    }

    pub fn with_backend(mut self, backend: &str) -> Self {
        self.backend = backend.to_string();
        self
    }

    pub fn with_tiles(mut self, tiles: &str) -> Self {
        self.tiles = tiles.to_string();
        self
    }

    /// Check every string-typed option; run when a diagram adopts the
    /// options.
    pub fn validate(&self) -> Result<(), OptionsError> {
        self.debug_flags()?;
        self.tile_grid()?;
        Ok(())
    }

    /// The `tiles` layout as (rows, columns).
    pub fn tile_grid(&self) -> Result<(usize, usize), OptionsError> {
        let invalid = || OptionsError::Tiles(self.tiles.clone());
        let (rows, cols) = self.tiles.split_once('x').ok_or_else(invalid)?;
        let rows = rows.parse().map_err(|_| invalid())?;
        let cols = cols.parse().map_err(|_| invalid())?;
        if rows == 0 || cols == 0 {
            return Err(invalid());
        }
        Ok((rows, cols))
    }

    /// The parsed debug flag string.
    pub fn debug_flags(&self) -> Result<DebugFlags, OptionsError> {
        let mut flags = DebugFlags::default();
        for c in self.debug.chars() {
            match c {
                'p' => flags.propagate = true,
                's' => flags.state = true,
                'd' => flags.deriv = true,
                other => return Err(OptionsError::DebugFlag(other)),
            }
        }
        Ok(flags)
    }

    /// Animation implies graphics.
    pub(crate) fn normalized(mut self) -> Self {
        if self.animation {
            self.graphics = true;
        }
        self
    }
}

/// Per-area debug switches decoded from the `debug` option string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugFlags {
    pub propagate: bool,
    pub state: bool,
    pub deriv: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.name, "main");
        assert!(options.graphics);
        assert!(!options.animation);
        assert!(options.progress);
        assert_eq!(options.debug, "");
        assert_eq!(options.backend, "Qt5Agg");
        assert_eq!(options.tiles, "3x4");
    }

    #[test]
    fn test_command_line_layer() {
        let options =
            Options::parse_from(["blocksim", "--nographics", "-p", "--debug", "ps", "-t", "2x2"]);
        assert!(!options.graphics);
        assert!(!options.progress);
        assert_eq!(options.tile_grid(), Ok((2, 2)));
        let flags = options.debug_flags().unwrap();
        assert!(flags.propagate && flags.state && !flags.deriv);
    }

    #[test]
    fn test_explicit_overrides_win() {
        let options = Options::parse_from(["blocksim", "--nographics"]).with_graphics(true);
        assert!(options.graphics);
    }

    #[test]
    fn test_animation_forces_graphics() {
        let options = Options::default()
            .with_graphics(false)
            .with_animation(true)
            .normalized();
        assert!(options.graphics);
    }

    #[test]
    fn test_validation() {
        assert!(Options::default().validate().is_ok());
        assert_eq!(
            Options::default().with_debug("px").validate(),
            Err(OptionsError::DebugFlag('x'))
        );
        assert_eq!(
            Options::default().with_tiles("wide").validate(),
            Err(OptionsError::Tiles("wide".into()))
        );
        assert_eq!(
            Options::default().with_tiles("0x4").validate(),
            Err(OptionsError::Tiles("0x4".into()))
        );
    }
}
