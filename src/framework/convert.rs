//! Conversion helpers between ndarray and burn tensors.

use burn::prelude::*;
use ndarray::{Array2, Array3};

use crate::error::{PrepError, PrepResult};

fn contiguous<T: Copy, D: ndarray::Dimension>(arr: &ndarray::Array<T, D>) -> Vec<T> {
    match arr.as_slice() {
        Some(slice) => slice.to_vec(),
        None => arr.iter().copied().collect(),
    }
}

/// Convert an ndarray Array2<f32> to a burn Tensor<B, 2>.
pub fn array2_to_float_tensor<B: Backend>(arr: &Array2<f32>, device: &B::Device) -> Tensor<B, 2> {
    let (rows, cols) = arr.dim();
    Tensor::from_data(TensorData::new(contiguous(arr), [rows, cols]), device)
}

/// Convert an ndarray Array1<i64> to a burn Tensor<B, 1, Int>.
pub fn array1_to_int_tensor<B: Backend>(
    arr: &ndarray::Array1<i64>,
    device: &B::Device,
) -> Tensor<B, 1, Int> {
    let len = arr.len();
    Tensor::from_data(TensorData::new(contiguous(arr), [len]), device)
}

/// Convert an ndarray Array2<i64> to a burn Tensor<B, 2, Int>.
pub fn array2_to_int_tensor<B: Backend>(
    arr: &Array2<i64>,
    device: &B::Device,
) -> Tensor<B, 2, Int> {
    let (rows, cols) = arr.dim();
    Tensor::from_data(TensorData::new(contiguous(arr), [rows, cols]), device)
}

/// Convert an ndarray Array3<i64> to a burn Tensor<B, 3, Int>.
pub fn array3_to_int_tensor<B: Backend>(
    arr: &Array3<i64>,
    device: &B::Device,
) -> Tensor<B, 3, Int> {
    let (a, b, c) = arr.dim();
    Tensor::from_data(TensorData::new(contiguous(arr), [a, b, c]), device)
}

/// Convert a burn Tensor<B, 2, Int> back to an ndarray Array2<i64>.
///
/// # Errors
///
/// Returns [`PrepError::ShapeMismatch`] if the tensor data cannot be read as `i64`.
pub fn int_tensor_to_array2<B: Backend>(tensor: Tensor<B, 2, Int>) -> PrepResult<Array2<i64>> {
    let [rows, cols] = tensor.dims();
    let data: Vec<i64> = tensor
        .into_data()
        .convert::<i64>()
        .to_vec()
        .map_err(|e| PrepError::ShapeMismatch(format!("tensor to vec: {e:?}")))?;
    Array2::from_shape_vec((rows, cols), data)
        .map_err(|e| PrepError::ShapeMismatch(format!("reshape to Array2: {e}")))
}

/// Convert a burn Tensor<B, 2> back to an ndarray Array2<f32>.
///
/// # Errors
///
/// Returns [`PrepError::ShapeMismatch`] if the tensor data cannot be read as `f32`.
pub fn float_tensor_to_array2<B: Backend>(tensor: Tensor<B, 2>) -> PrepResult<Array2<f32>> {
    let [rows, cols] = tensor.dims();
    let data: Vec<f32> = tensor
        .into_data()
        .convert::<f32>()
        .to_vec()
        .map_err(|e| PrepError::ShapeMismatch(format!("tensor to vec: {e:?}")))?;
    Array2::from_shape_vec((rows, cols), data)
        .map_err(|e| PrepError::ShapeMismatch(format!("reshape to Array2: {e}")))
}
