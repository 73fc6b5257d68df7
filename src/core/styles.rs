//! Style roles for terminal output.
//!
//! Each logical role is a variant of `StyleRole` mapped to a `colored::Color`.
//! Colouring is applied only when the `enabled` flag passed to `paint()` is true,
//! so there is no global colour state beyond what `colored` itself keeps.
//!
//! ```
//! use repotrack::core::styles::StyleRole;
//! assert_eq!(StyleRole::Path.paint("/work/a", false), "/work/a");
//! assert!(StyleRole::Failure.paint("failed", true).contains("failed"));
//! ```

use clap::builder::styling::AnsiColor;
use colored::{Color, Colorize};

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }
        }
    };
}

style! {
    Header  => Some(Color::Yellow),
    Name    => Some(Color::BrightGreen),
    Path    => Some(Color::Cyan),
    Label   => None,
    Success => Some(Color::Green),
    Failure => Some(Color::BrightRed),
    Skipped => Some(Color::Yellow),
    Dim     => Some(Color::BrightBlack),
}

impl StyleRole {
    pub fn paint(self, text: &str, enabled: bool) -> String {
        match (enabled, self.color()) {
            (true, Some(color)) => {
                let painted = text.color(color);
                if self == StyleRole::Header {
                    painted.bold().to_string()
                } else {
                    painted.to_string()
                }
            }
            _ => text.to_string(),
        }
    }

    /// prettytable `style_spec` for this role, e.g. `Fy`
    pub fn to_prettytable_spec(self) -> Option<String> {
        let spec_char = match self.color()? {
            Color::Black => "k",
            Color::Red => "r",
            Color::Green => "g",
            Color::Yellow => "y",
            Color::Blue => "b",
            Color::Magenta => "m",
            Color::Cyan => "c",
            Color::White => "w",
            Color::BrightBlack => "K",
            Color::BrightRed => "R",
            Color::BrightGreen => "G",
            Color::BrightYellow => "Y",
            Color::BrightBlue => "B",
            Color::BrightMagenta => "M",
            Color::BrightCyan => "C",
            Color::BrightWhite => "W",
            _ => return None,
        };
        Some(format!("F{}", spec_char))
    }
}

fn color_to_ansi(c: Color) -> Option<AnsiColor> {
    use self::AnsiColor as A;
    use Color::*;
    Some(match c {
        Black => A::Black,
        Red => A::Red,
        Green => A::Green,
        Yellow => A::Yellow,
        Blue => A::Blue,
        Magenta => A::Magenta,
        Cyan => A::Cyan,
        White => A::White,
        BrightBlack => A::BrightBlack,
        BrightRed => A::BrightRed,
        BrightGreen => A::BrightGreen,
        BrightYellow => A::BrightYellow,
        BrightBlue => A::BrightBlue,
        BrightMagenta => A::BrightMagenta,
        BrightCyan => A::BrightCyan,
        BrightWhite => A::BrightWhite,
        _ => return None,
    })
}

/// clap help styles built from the same roles
pub fn palette_to_clap(enabled: bool) -> clap::builder::Styles {
    use clap::builder::styling::{Color as ClapColor, Style};
    if !enabled {
        return clap::builder::Styles::plain();
    }

    let style = |role: StyleRole, bold: bool| {
        let mut s = Style::new();
        if let Some(col) = role.color().and_then(color_to_ansi) {
            s = s.fg_color(Some(ClapColor::Ansi(col)));
        }
        if bold {
            s = s.bold();
        }
        s
    };

    clap::builder::Styles::styled()
        .header(style(StyleRole::Header, true))
        .usage(style(StyleRole::Header, true))
        .literal(style(StyleRole::Name, false))
        .placeholder(style(StyleRole::Path, false))
        .valid(style(StyleRole::Success, false))
        .invalid(style(StyleRole::Failure, false))
        .error(style(StyleRole::Failure, false))
}
