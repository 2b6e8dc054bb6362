// Copyright 2019
//     by  Centrality Investments Ltd.
//     and Parity Technologies (UK) Ltd.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::meta_type::{HasShape, MetaType, Shape};

/// An error that may be encountered upon constructing arrays.
#[derive(PartialEq, Eq, Debug, thiserror::Error)]
pub enum ShapeError {
	/// The flat data length does not match the product of the lengths.
	#[error("shape describes {expected} elements but {actual} were supplied")]
	LengthMismatch { expected: u64, actual: usize },
	/// Lower bounds were supplied for a different number of dimensions
	/// than the lengths describe.
	#[error("{bounds} lower bounds for {rank} dimensions")]
	BoundsRankMismatch { rank: usize, bounds: usize },
}

/// A multi-dimensional array in row-major order.
///
/// Rank, per-dimension lengths and lower bounds are properties of the
/// value; empty lower bounds mean every dimension starts at 0.
#[derive(Clone, Debug, PartialEq)]
pub struct NdArray<T> {
	lengths: Vec<u32>,
	lower_bounds: Vec<u32>,
	data: Vec<T>,
}

impl<T> NdArray<T> {
	/// Creates an array with zero-based dimensions.
	pub fn new(lengths: Vec<u32>, data: Vec<T>) -> Result<Self, ShapeError> {
		Self::from_shape(lengths, Vec::new(), data)
	}

	/// Creates an array from an explicit shape.
	pub fn from_shape(
		lengths: Vec<u32>,
		lower_bounds: Vec<u32>,
		data: Vec<T>,
	) -> Result<Self, ShapeError> {
		if !(lower_bounds.is_empty() || lower_bounds.len() == lengths.len()) {
			return Err(ShapeError::BoundsRankMismatch {
				rank: lengths.len(),
				bounds: lower_bounds.len(),
			});
		}
		let expected: u64 = lengths.iter().map(|&l| u64::from(l)).product();
		if expected != data.len() as u64 {
			return Err(ShapeError::LengthMismatch {
				expected,
				actual: data.len(),
			});
		}
		Ok(Self {
			lengths,
			lower_bounds,
			data,
		})
	}

	/// Number of dimensions.
	pub fn rank(&self) -> usize {
		self.lengths.len()
	}

	/// Per-dimension lengths.
	pub fn lengths(&self) -> &[u32] {
		&self.lengths
	}

	/// Per-dimension lower bounds; empty means all zero.
	pub fn lower_bounds(&self) -> &[u32] {
		&self.lower_bounds
	}

	/// The elements in row-major order.
	pub fn data(&self) -> &[T] {
		&self.data
	}

	/// The element at the given multi-dimensional index, honoring lower
	/// bounds.
	pub fn get(&self, indices: &[u32]) -> Option<&T> {
		if indices.len() != self.lengths.len() {
			return None;
		}
		let mut linear = 0u64;
		for (dim, &index) in indices.iter().enumerate() {
			let lower = self.lower_bounds.get(dim).copied().unwrap_or(0);
			let offset = index.checked_sub(lower)?;
			if offset >= self.lengths[dim] {
				return None;
			}
			linear = linear * u64::from(self.lengths[dim]) + u64::from(offset);
		}
		self.data.get(linear as usize)
	}
}

impl<T> HasShape for NdArray<T>
where
	T: HasShape,
{
	fn shape() -> Shape {
		Shape::Array {
			element: MetaType::new::<T>(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_mismatched_data() {
		assert_eq!(
			NdArray::new(vec![2, 3], vec![0i32; 5]),
			Err(ShapeError::LengthMismatch {
				expected: 6,
				actual: 5
			})
		);
	}

	#[test]
	fn rejects_mismatched_bounds() {
		assert_eq!(
			NdArray::from_shape(vec![2], vec![1, 1], vec![0i32; 2]),
			Err(ShapeError::BoundsRankMismatch { rank: 1, bounds: 2 })
		);
	}

	#[test]
	fn indexes_row_major() {
		let array = NdArray::new(vec![2, 3], (0..6).collect::<Vec<i32>>()).unwrap();
		assert_eq!(array.get(&[0, 0]), Some(&0));
		assert_eq!(array.get(&[0, 2]), Some(&2));
		assert_eq!(array.get(&[1, 0]), Some(&3));
		assert_eq!(array.get(&[1, 2]), Some(&5));
		assert_eq!(array.get(&[2, 0]), None);
	}

	#[test]
	fn honors_lower_bounds() {
		let array = NdArray::from_shape(vec![2], vec![10], vec![7i32, 8]).unwrap();
		assert_eq!(array.get(&[10]), Some(&7));
		assert_eq!(array.get(&[11]), Some(&8));
		assert_eq!(array.get(&[9]), None);
		assert_eq!(array.get(&[12]), None);
	}
}
