use std::sync::Arc;

use super::{CstyleFoldMode, FoldMode, PhpFoldMode};
use crate::models::{FoldRange, FoldStyle, FoldWidget};
use crate::session::Session;

/// Routes fold queries to per-language sub-modes by tokenizer state tag.
///
/// A row belongs to the language its state tag carries as a prefix. The row
/// above is consulted first: the state stored per row is the state at its
/// end, so a row that opens a region (`<?php`, `<script>`) is still tagged
/// with the embedded language, while the fold it starts should be judged by
/// the region it opens into.
pub struct MixedFoldMode {
    default_mode: Arc<dyn FoldMode>,
    sub_modes: Vec<(String, Arc<dyn FoldMode>)>,
}

impl MixedFoldMode {
    pub fn new(default_mode: Arc<dyn FoldMode>, sub_modes: Vec<(String, Arc<dyn FoldMode>)>) -> Self {
        Self {
            default_mode,
            sub_modes,
        }
    }

    /// The standard wiring for mixed PHP documents: keyword folding in PHP
    /// regions, brace/comment folding in script and style regions, and the
    /// PHP mode (with its own brace fallback) everywhere else.
    pub fn php() -> Self {
        let php: Arc<PhpFoldMode> = Arc::new(PhpFoldMode::new());
        let cstyle: Arc<CstyleFoldMode> = Arc::new(CstyleFoldMode::new());
        Self::new(
            php.clone(),
            vec![
                ("js-".to_string(), cstyle.clone() as Arc<dyn FoldMode>),
                ("css-".to_string(), cstyle as Arc<dyn FoldMode>),
                ("php-".to_string(), php as Arc<dyn FoldMode>),
            ],
        )
    }

    fn mode_for(&self, state: &str) -> Option<&dyn FoldMode> {
        self.sub_modes
            .iter()
            .find(|(prefix, _)| state.starts_with(prefix.as_str()))
            .map(|(_, mode)| mode.as_ref())
    }

    /// Candidate states for a row, in routing order
    fn states<'s>(&self, session: &'s Session, row: usize) -> [Option<&'s str>; 2] {
        let above = row.checked_sub(1).and_then(|r| session.state(r));
        [above, session.state(row)]
    }
}

impl FoldMode for MixedFoldMode {
    fn fold_widget(&self, session: &Session, fold_style: FoldStyle, row: usize) -> FoldWidget {
        for state in self.states(session, row) {
            if let Some(mode) = state.and_then(|s| self.mode_for(s)) {
                let widget = mode.fold_widget(session, fold_style, row);
                if widget != FoldWidget::None {
                    return widget;
                }
            }
        }
        self.default_mode.fold_widget(session, fold_style, row)
    }

    fn fold_widget_range(
        &self,
        session: &Session,
        fold_style: FoldStyle,
        row: usize,
    ) -> Option<FoldRange> {
        for state in self.states(session, row) {
            if let Some(mode) = state.and_then(|s| self.mode_for(s)) {
                if mode.fold_widget(session, fold_style, row) != FoldWidget::None {
                    return mode.fold_widget_range(session, fold_style, row);
                }
            }
        }
        self.default_mode.fold_widget_range(session, fold_style, row)
    }
}
