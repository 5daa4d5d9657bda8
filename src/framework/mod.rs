//! Hand-off to the burn deep-learning framework.
//!
//! The training loop consumes [`ImdbBatch`]: integer word indices, integer
//! character codes and labels, plus the embedding matrix as initial weights
//! of the word embedding layer.

pub mod convert;

use burn::prelude::*;

use crate::data::embedding::EmbeddingMatrix;
use crate::data::samples::SampleBatch;

use convert::{
    array1_to_int_tensor, array2_to_float_tensor, array2_to_int_tensor, array3_to_int_tensor,
};

/// A [`SampleBatch`] on a burn device.
#[derive(Debug, Clone)]
pub struct ImdbBatch<B: Backend> {
    /// `[n, sequence_len]`
    pub words: Tensor<B, 2, Int>,
    /// `[n, sequence_len, word_char_len]`
    pub chars: Tensor<B, 3, Int>,
    /// `[n]`
    pub labels: Tensor<B, 1, Int>,
}

/// Move a batch onto `device` as integer tensors.
pub fn batch_to_tensors<B: Backend>(batch: &SampleBatch, device: &B::Device) -> ImdbBatch<B> {
    ImdbBatch {
        words: array2_to_int_tensor(&batch.words, device),
        chars: array3_to_int_tensor(&batch.chars, device),
        labels: array1_to_int_tensor(&batch.labels, device),
    }
}

/// Embedding weights as a `[max_words, embedding_dim]` float tensor.
pub fn embedding_to_tensor<B: Backend>(
    matrix: &EmbeddingMatrix,
    device: &B::Device,
) -> Tensor<B, 2> {
    array2_to_float_tensor(&matrix.weights, device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::samples::{preprocess_dataset, Example, PipelineContext};
    use crate::data::vocab::VocabularyIndex;
    use crate::Config;
    use burn::backend::NdArray;
    use convert::{float_tensor_to_array2, int_tensor_to_array2};
    use ndarray::Array2;

    type TestBackend = NdArray<f32>;

    fn small_batch() -> SampleBatch {
        let vocab = VocabularyIndex::from_pairs([("fun", 1), ("dull", 2)]).expect("vocab");
        let config = Config {
            max_words: 50,
            sequence_len: 4,
            word_char_len: 5,
            ..Config::default()
        };
        let ctx = PipelineContext::new(config, vocab).expect("context");
        let examples = vec![
            Example::from_raw(vec![1, 2], 1).expect("example"),
            Example::from_raw(vec![2, 2, 2, 2, 2], 0).expect("example"),
            Example::from_raw(vec![], 0).expect("example"),
        ];
        SampleBatch::from_samples(&preprocess_dataset(&examples, &ctx)).expect("batch")
    }

    #[test]
    fn test_batch_tensor_shapes() {
        let device = Default::default();
        let batch = small_batch();
        let tensors = batch_to_tensors::<TestBackend>(&batch, &device);
        assert_eq!(tensors.words.dims(), [3, 4]);
        assert_eq!(tensors.chars.dims(), [3, 4, 5]);
        assert_eq!(tensors.labels.dims(), [3]);
    }

    #[test]
    fn test_word_tensor_values() {
        let device = Default::default();
        let batch = small_batch();
        let tensors = batch_to_tensors::<TestBackend>(&batch, &device);
        let words = int_tensor_to_array2(tensors.words).expect("read back");
        assert_eq!(words, batch.words);
    }

    #[test]
    fn test_embedding_tensor() {
        let device = Default::default();
        let weights = Array2::from_shape_vec((3, 2), vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6])
            .expect("shape");
        let matrix = EmbeddingMatrix {
            weights: weights.clone(),
            pretrained_rows: 3,
            random_rows: 0,
        };
        let tensor = embedding_to_tensor::<TestBackend>(&matrix, &device);
        assert_eq!(tensor.dims(), [3, 2]);
        let back = float_tensor_to_array2(tensor).expect("read back");
        assert_eq!(back, weights);
    }
}
