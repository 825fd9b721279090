//! Host/device conversion between `ndarray` arrays and burn tensors.
//!
//! Burn tensors carry their rank as a const generic while environment
//! payloads are rank-erased host arrays, so the bridge dispatches on rank at
//! runtime. Ranks 1 through 4 cover every shape the wrapper chain produces:
//! stacked observations are `[n_envs, channels, rows, cols]`, telemetry
//! entries are `[n_envs, players]`.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use ndarray::{ArrayD, IxDyn};

/// Device-resident tensor with runtime-dispatched rank.
#[derive(Debug, Clone)]
pub enum DynTensor<B: Backend> {
    /// Rank-1 tensor.
    Rank1(Tensor<B, 1>),
    /// Rank-2 tensor.
    Rank2(Tensor<B, 2>),
    /// Rank-3 tensor.
    Rank3(Tensor<B, 3>),
    /// Rank-4 tensor.
    Rank4(Tensor<B, 4>),
}

impl<B: Backend> DynTensor<B> {
    /// Upload a host array to the device.
    ///
    /// The transfer may be asynchronous on the backend; burn synchronizes it
    /// before any read of the resulting tensor.
    pub fn from_array(arr: &ArrayD<f32>, device: &B::Device) -> Self {
        let values: Vec<f32> = arr.iter().copied().collect();
        let flat = Tensor::<B, 1>::from_floats(values.as_slice(), device);
        match arr.shape() {
            &[_] => Self::Rank1(flat),
            &[a, b] => Self::Rank2(flat.reshape([a, b])),
            &[a, b, c] => Self::Rank3(flat.reshape([a, b, c])),
            &[a, b, c, d] => Self::Rank4(flat.reshape([a, b, c, d])),
            _ => panic!(
                "unsupported rank {} for device transfer (expected 1..=4)",
                arr.ndim()
            ),
        }
    }

    /// Download the tensor back to a host array.
    ///
    /// Reads go through `into_data`, which waits for any in-flight transfer,
    /// so the caller never observes a transfer race.
    pub fn to_array(&self) -> ArrayD<f32> {
        let data = match self {
            Self::Rank1(t) => t.clone().into_data(),
            Self::Rank2(t) => t.clone().into_data(),
            Self::Rank3(t) => t.clone().into_data(),
            Self::Rank4(t) => t.clone().into_data(),
        };
        let shape = data.shape.clone();
        let values = data
            .convert::<f32>()
            .to_vec::<f32>()
            .expect("converted tensor data is f32");
        ArrayD::from_shape_vec(IxDyn(&shape), values)
            .expect("tensor shape matches element count")
    }

    /// Shape of the tensor.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Self::Rank1(t) => t.dims().to_vec(),
            Self::Rank2(t) => t.dims().to_vec(),
            Self::Rank3(t) => t.dims().to_vec(),
            Self::Rank4(t) => t.dims().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use ndarray::{ArrayD, IxDyn};
    use rand::{Rng, SeedableRng};

    use super::*;

    type TestBackend = NdArray<f32>;

    fn random_array(shape: &[usize], seed: u64) -> ArrayD<f32> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let len: usize = shape.iter().product();
        let values: Vec<f32> = (0..len).map(|_| rng.gen_range(-10.0..10.0)).collect();
        ArrayD::from_shape_vec(IxDyn(shape), values).unwrap()
    }

    #[test]
    fn test_round_trip_is_bit_identical() {
        let device = Default::default();
        for (seed, shape) in [
            (1, vec![7]),
            (2, vec![3, 5]),
            (3, vec![2, 4, 4]),
            (4, vec![2, 3, 4, 4]),
        ] {
            let arr = random_array(&shape, seed);
            let tensor = DynTensor::<TestBackend>::from_array(&arr, &device);
            let back = tensor.to_array();
            assert_eq!(back.shape(), arr.shape());
            for (a, b) in arr.iter().zip(back.iter()) {
                assert_eq!(a.to_bits(), b.to_bits());
            }
        }
    }

    #[test]
    fn test_shape_matches_source() {
        let device = Default::default();
        let arr = random_array(&[2, 3, 8, 8], 5);
        let tensor = DynTensor::<TestBackend>::from_array(&arr, &device);
        assert_eq!(tensor.shape(), vec![2, 3, 8, 8]);
    }

    #[test]
    #[should_panic(expected = "unsupported rank")]
    fn test_rank_five_rejected() {
        let device = Default::default();
        let arr = ArrayD::<f32>::zeros(IxDyn(&[1, 1, 1, 1, 1]));
        let _ = DynTensor::<TestBackend>::from_array(&arr, &device);
    }
}
