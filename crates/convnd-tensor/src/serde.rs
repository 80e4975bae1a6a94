use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Tensor;

// on-the-wire form: the shape and the row-major elements, strides are implied
#[derive(Serialize)]
struct TensorRef<'a, T> {
    shape: &'a [usize],
    data: &'a [T],
}

#[derive(Deserialize)]
struct TensorOwned<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}

impl<T: Serialize, const N: usize> Serialize for Tensor<T, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TensorRef {
            shape: &self.shape,
            data: &self.storage,
        }
        .serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>, const N: usize> Deserialize<'de> for Tensor<T, N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let TensorOwned { shape, data } = TensorOwned::deserialize(deserializer)?;
        let rank = shape.len();
        let shape: [usize; N] = shape.try_into().map_err(|_| {
            serde::de::Error::custom(format!("expected a shape of rank {N}, got rank {rank}"))
        })?;
        Tensor::from_shape_vec(shape, data).map_err(serde::de::Error::custom)
    }
}
