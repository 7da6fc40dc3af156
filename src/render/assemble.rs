//! Linearizes page text and asset references into one document.

use crate::model::{AssembledDocument, PageAssetIndex, PageBlock};

/// Build the document from `(page, filtered text)` pairs and the asset index.
///
/// Pages are emitted in the order given; each block carries the page's table
/// reference, then its images, then its vector renders.
pub fn assemble<I, S>(pages: I, index: &PageAssetIndex) -> AssembledDocument
where
    I: IntoIterator<Item = (usize, S)>,
    S: Into<String>,
{
    let blocks = pages
        .into_iter()
        .map(|(page, text)| {
            let references = index
                .get(page)
                .map(|assets| assets.references().map(str::to_string).collect())
                .unwrap_or_default();
            PageBlock {
                page,
                text: text.into(),
                references,
            }
        })
        .collect::<Vec<_>>();

    log::debug!(
        "Assembled {} page blocks with {} references",
        blocks.len(),
        blocks.iter().map(|b| b.references.len()).sum::<usize>()
    );

    AssembledDocument { blocks }
}
