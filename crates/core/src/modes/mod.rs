mod cstyle;
mod mixed;
mod php;

pub use cstyle::CstyleFoldMode;
pub use mixed::MixedFoldMode;
pub use php::PhpFoldMode;

use crate::models::{FoldRange, FoldStyle, FoldWidget};
use crate::session::Session;

/// A per-language fold strategy: classify a row's fold widget and compute the
/// range it would collapse.
///
/// Fold queries never fail; a row with nothing foldable yields
/// [`FoldWidget::None`] and `None` respectively.
pub trait FoldMode: Send + Sync {
    /// Widget verdict for a row.
    fn fold_widget(&self, session: &Session, fold_style: FoldStyle, row: usize) -> FoldWidget;

    /// The text span a fold starting (or ending) on this row would collapse.
    fn fold_widget_range(
        &self,
        session: &Session,
        fold_style: FoldStyle,
        row: usize,
    ) -> Option<FoldRange>;
}
