//! Closed enumerations for status/category fields.

/// A field drawn from a fixed, closed set of labels.
///
/// `ALL[0]` is the neutral default used when a form leaves the field empty
/// or submits a label outside the set.
pub trait Choice: Copy + Eq + 'static {
    const ALL: &'static [Self];

    fn label(&self) -> &'static str;

    /// Case-insensitive label match that ignores spaces, dashes and underscores
    /// (`"in_progress"`, `"In Progress"` and `"inprogress"` all match).
    fn parse(input: &str) -> Option<Self> {
        let wanted = squash(input);
        if wanted.is_empty() {
            return None;
        }
        Self::ALL
            .iter()
            .copied()
            .find(|c| squash(c.label()) == wanted)
    }

    /// Position in `ALL`. Ordinal sorts use their own rank tables instead.
    fn index(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(0)
    }

    /// Comma separated list of labels, for help output.
    fn labels() -> String {
        Self::ALL
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Declares a closed enumeration whose serialized form is its label.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $( #[serde(rename = $label)] $variant ),+
        }

        impl $crate::record::Choice for $name {
            const ALL: &'static [Self] = &[ $( Self::$variant ),+ ];

            fn label(&self) -> &'static str {
                match self {
                    $( Self::$variant => $label ),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                <Self as $crate::record::Choice>::ALL[0]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::record::Choice::label(self))
            }
        }
    };
}

pub(crate) use choice_enum;
