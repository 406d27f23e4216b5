use super::ArgStyle;

/// One task type's option table.
///
/// The key set is closed, so an option without a rank cannot be constructed.
/// Ranks follow declaration order and drive the registry's iteration order.
pub trait ArgKey: Copy + Ord + std::fmt::Debug + Send + Sync + 'static {
    /// Every option of the task type, in rank order.
    const TABLE: &'static [Self];

    /// Stable property name (`"HashStyle"`, `"OutputFile"`).
    fn name(self) -> &'static str;

    fn style(self) -> ArgStyle;

    fn rank(self) -> usize;

    /// Property names are matched case-insensitively, as build engines do.
    fn from_name(name: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(name))
    }
}

/// Declares an option table: an enum whose variant order is the priority
/// order, together with each option's rendering style.
///
/// ```
/// use llvm_tasks_core::arg_table;
/// use llvm_tasks_core::args::{ArgKey, ArgStyle};
///
/// arg_table! {
///     pub enum DemoArg {
///         Verbose => ArgStyle::Flag("-v"),
///         OutputFile => ArgStyle::Separate("-o"),
///     }
/// }
///
/// assert!(DemoArg::Verbose.rank() < DemoArg::OutputFile.rank());
/// assert_eq!(DemoArg::from_name("outputfile"), Some(DemoArg::OutputFile));
/// ```
#[macro_export]
macro_rules! arg_table {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $style:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::args::ArgKey for $name {
            const TABLE: &'static [Self] = &[ $( $name::$variant ),+ ];

            fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => stringify!($variant) ),+
                }
            }

            fn style(self) -> $crate::args::ArgStyle {
                match self {
                    $( $name::$variant => $style ),+
                }
            }

            fn rank(self) -> usize {
                self as usize
            }
        }
    };
}
