//! Ordered composition of in-place block transforms.

use crate::{Bwt, Mtft};
use log::trace;
use oxiblock_core::error::Result;
use oxiblock_core::traits::ByteTransform;

/// An ordered list of [`ByteTransform`] stages applied to one block.
///
/// `forward` runs the stages first to last, `inverse` last to first. The
/// primary index reported by a stage (the BWT) is returned from `forward` and
/// must be handed back to `inverse`.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn ByteTransform + Send>>,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// The BWT followed by the MTFT.
    pub fn bwt_mtft() -> Self {
        Self::new().with_stage(Bwt::new()).with_stage(Mtft::new())
    }

    /// Append a stage.
    pub fn with_stage<T: ByteTransform + Send + 'static>(mut self, stage: T) -> Self {
        self.push(Box::new(stage));
        self
    }

    /// Append a boxed stage.
    pub fn push(&mut self, stage: Box<dyn ByteTransform + Send>) {
        self.stages.push(stage);
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Check if the pipeline has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Transform `block` in place through every stage.
    ///
    /// Returns the primary index of the last stage that reports one.
    pub fn forward(&mut self, block: &mut [u8]) -> Result<Option<u32>> {
        let mut primary_index = None;

        for (i, stage) in self.stages.iter_mut().enumerate() {
            stage.set_size(block.len())?;
            stage.forward(block)?;

            if let Some(index) = stage.primary_index() {
                primary_index = Some(index);
            }

            trace!("Pipeline stage {} forward over {} bytes", i, block.len());
        }

        Ok(primary_index)
    }

    /// Undo [`forward`](Self::forward) in place.
    pub fn inverse(&mut self, block: &mut [u8], primary_index: Option<u32>) -> Result<()> {
        for (i, stage) in self.stages.iter_mut().enumerate().rev() {
            stage.set_size(block.len())?;

            if let Some(index) = primary_index {
                stage.set_primary_index(index)?;
            }

            stage.inverse(block)?;
            trace!("Pipeline stage {} inverse over {} bytes", i, block.len());
        }

        Ok(())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages.len())
            .finish()
    }
}
