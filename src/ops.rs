//! Shape descriptors for tensors and the operations that consume them.
//!
//! Factories treat these as opaque parameter bags. The `verify` helpers are for backends that
//! want to reject an inconsistent descriptor at graph construction time rather than during
//! execution.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The shape of a tensor, outermost dimension first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TensorDimensions {
    shape: Vec<usize>,
}

impl TensorDimensions {
    /// Creates dimensions from a shape.
    pub fn new(shape: impl Into<Vec<usize>>) -> Self {
        Self {
            shape: shape.into(),
        }
    }

    /// The number of dimensions.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// The number of elements a tensor of this shape holds.
    pub fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }

    /// The shape as a slice.
    pub fn as_slice(&self) -> &[usize] {
        &self.shape
    }

    /// Collapses the dimensions before and after `axis` into a 2D shape.
    ///
    /// `axis == 0` yields `[1, n]`, `axis == rank` yields `[n, 1]`. Returns `None` if `axis` is
    /// larger than the rank.
    pub fn flatten(&self, axis: usize) -> Option<Self> {
        if axis > self.rank() {
            return None;
        }
        let (outer, inner) = self.shape.split_at(axis);
        Some(Self::new([
            outer.iter().product::<usize>(),
            inner.iter().product::<usize>(),
        ]))
    }
}

impl From<Vec<usize>> for TensorDimensions {
    fn from(shape: Vec<usize>) -> Self {
        Self::new(shape)
    }
}

impl<const N: usize> From<[usize; N]> for TensorDimensions {
    fn from(shape: [usize; N]) -> Self {
        Self::new(shape)
    }
}

fn invalid(operation: &str, reason: impl std::fmt::Display) -> Error {
    Error::InvalidDescriptor(format!("{operation}: {reason}"))
}

fn check_output<const N: usize>(
    operation: &str,
    expected: [usize; N],
    declared: [usize; N],
) -> Result<(), Error> {
    if expected == declared {
        Ok(())
    } else {
        Err(invalid(
            operation,
            format!("declared output shape {declared:?}, expected {expected:?}"),
        ))
    }
}

/// A 2D convolution over a `[channels, height, width]` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conv2DOp {
    /// `[channels, height, width]`
    pub input_shape: [usize; 3],
    /// `[output channels, input channels, kernel height, kernel width]`
    pub kernel_shape: [usize; 4],
    /// `[output channels, height, width]`
    pub output_shape: [usize; 3],
    /// `[height, width]`
    pub dilations: [usize; 2],
    /// `[top, left, bottom, right]`
    pub pads: [usize; 4],
    /// `[height, width]`
    pub strides: [usize; 2],
}

impl Conv2DOp {
    /// Derives the output shape from input, kernel, dilations, pads and strides.
    pub fn compute_output_shape(&self) -> Result<[usize; 3], Error> {
        let [channels, height, width] = self.input_shape;
        let [out_channels, kernel_channels, kernel_h, kernel_w] = self.kernel_shape;
        if kernel_channels != channels {
            return Err(invalid(
                "Conv2D",
                format!("kernel expects {kernel_channels} channels, input has {channels}"),
            ));
        }
        if self.strides.contains(&0) || self.dilations.contains(&0) {
            return Err(invalid("Conv2D", "strides and dilations must be positive"));
        }
        if kernel_h == 0 || kernel_w == 0 {
            return Err(invalid("Conv2D", "kernel must not be empty"));
        }
        let [pad_top, pad_left, pad_bottom, pad_right] = self.pads;
        let out_h = sliding_windows(
            height + pad_top + pad_bottom,
            self.dilations[0] * (kernel_h - 1) + 1,
            self.strides[0],
        )
        .ok_or_else(|| invalid("Conv2D", "kernel is higher than the padded input"))?;
        let out_w = sliding_windows(
            width + pad_left + pad_right,
            self.dilations[1] * (kernel_w - 1) + 1,
            self.strides[1],
        )
        .ok_or_else(|| invalid("Conv2D", "kernel is wider than the padded input"))?;
        Ok([out_channels, out_h, out_w])
    }

    /// Checks that the declared output shape matches the derived one.
    pub fn verify(&self) -> Result<(), Error> {
        check_output("Conv2D", self.compute_output_shape()?, self.output_shape)
    }

    /// The shape of the (optional) bias tensor: one value per output channel.
    pub fn bias_shape(&self) -> [usize; 1] {
        [self.kernel_shape[0]]
    }
}

/// `floor((extent - window) / stride) + 1`, or `None` if the window does not fit.
fn sliding_windows(extent: usize, window: usize, stride: usize) -> Option<usize> {
    extent.checked_sub(window).map(|rest| rest / stride + 1)
}

/// A general matrix multiplication `op(A) * op(B)` where `op` optionally transposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GemmOp {
    /// Stored shape of `A`, before transposition.
    pub input_a_shape: [usize; 2],
    /// Stored shape of `B`, before transposition.
    pub input_b_shape: [usize; 2],
    /// `[m, n]`
    pub output_shape: [usize; 2],
    /// Whether `A` is used transposed.
    pub transpose_a: bool,
    /// Whether `B` is used transposed.
    pub transpose_b: bool,
}

impl GemmOp {
    /// Returns `[m, k, n]` after applying the transpose flags.
    pub fn dimensions(&self) -> Result<[usize; 3], Error> {
        let [m, k] = transposed(self.input_a_shape, self.transpose_a);
        let [k_b, n] = transposed(self.input_b_shape, self.transpose_b);
        if k != k_b {
            return Err(invalid(
                "Gemm",
                format!("inner dimensions differ: {k} vs {k_b}"),
            ));
        }
        Ok([m, k, n])
    }

    /// Derives the output shape `[m, n]`.
    pub fn compute_output_shape(&self) -> Result<[usize; 2], Error> {
        let [m, _, n] = self.dimensions()?;
        Ok([m, n])
    }

    /// Checks that the declared output shape matches the derived one.
    pub fn verify(&self) -> Result<(), Error> {
        check_output("Gemm", self.compute_output_shape()?, self.output_shape)
    }
}

fn transposed([rows, cols]: [usize; 2], transpose: bool) -> [usize; 2] {
    if transpose { [cols, rows] } else { [rows, cols] }
}

/// An elementwise (Hadamard) product of two equally shaped matrices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HammOp {
    /// Shape of the first operand.
    pub input_a_shape: [usize; 2],
    /// Shape of the second operand.
    pub input_b_shape: [usize; 2],
    /// Shape of the product.
    pub output_shape: [usize; 2],
}

impl HammOp {
    /// Checks that all three shapes agree.
    pub fn verify(&self) -> Result<(), Error> {
        if self.input_a_shape != self.input_b_shape {
            return Err(invalid(
                "Hamm",
                format!(
                    "operand shapes differ: {:?} vs {:?}",
                    self.input_a_shape, self.input_b_shape
                ),
            ));
        }
        check_output("Hamm", self.input_a_shape, self.output_shape)
    }
}

/// A max pooling over a `[channels, height, width]` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxPoolOp {
    /// `[channels, height, width]`
    pub input_shape: [usize; 3],
    /// `[channels, height, width]`
    pub output_shape: [usize; 3],
    /// `[height, width]`
    pub kernel_shape: [usize; 2],
    /// `[height, width]`
    pub strides: [usize; 2],
    /// `[top, left, bottom, right]`
    pub pads: [usize; 4],
}

impl MaxPoolOp {
    /// Derives the output shape.
    pub fn compute_output_shape(&self) -> Result<[usize; 3], Error> {
        pool_output_shape(
            "MaxPool",
            self.input_shape,
            self.kernel_shape,
            self.strides,
            self.pads,
        )
    }

    /// Checks that the declared output shape matches the derived one.
    pub fn verify(&self) -> Result<(), Error> {
        check_output("MaxPool", self.compute_output_shape()?, self.output_shape)
    }
}

/// An average pooling over a `[channels, height, width]` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AveragePoolOp {
    /// `[channels, height, width]`
    pub input_shape: [usize; 3],
    /// `[channels, height, width]`
    pub output_shape: [usize; 3],
    /// `[height, width]`
    pub kernel_shape: [usize; 2],
    /// `[height, width]`
    pub strides: [usize; 2],
    /// `[top, left, bottom, right]`
    pub pads: [usize; 4],
}

impl AveragePoolOp {
    /// Derives the output shape.
    pub fn compute_output_shape(&self) -> Result<[usize; 3], Error> {
        pool_output_shape(
            "AveragePool",
            self.input_shape,
            self.kernel_shape,
            self.strides,
            self.pads,
        )
    }

    /// Checks that the declared output shape matches the derived one.
    pub fn verify(&self) -> Result<(), Error> {
        check_output("AveragePool", self.compute_output_shape()?, self.output_shape)
    }
}

fn pool_output_shape(
    operation: &str,
    [channels, height, width]: [usize; 3],
    [kernel_h, kernel_w]: [usize; 2],
    [stride_h, stride_w]: [usize; 2],
    [pad_top, pad_left, pad_bottom, pad_right]: [usize; 4],
) -> Result<[usize; 3], Error> {
    if stride_h == 0 || stride_w == 0 || kernel_h == 0 || kernel_w == 0 {
        return Err(invalid(operation, "kernel and strides must be positive"));
    }
    let out_h = sliding_windows(height + pad_top + pad_bottom, kernel_h, stride_h)
        .ok_or_else(|| invalid(operation, "kernel is higher than the padded input"))?;
    let out_w = sliding_windows(width + pad_left + pad_right, kernel_w, stride_w)
        .ok_or_else(|| invalid(operation, "kernel is wider than the padded input"))?;
    Ok([channels, out_h, out_w])
}

/// A concatenation of two tensors along one axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinOp {
    /// Shape of the first operand.
    pub input_a_shape: Vec<usize>,
    /// Shape of the second operand.
    pub input_b_shape: Vec<usize>,
    /// Shape of the result.
    pub output_shape: Vec<usize>,
    /// The axis along which the operands are joined.
    pub axis: usize,
}

impl JoinOp {
    /// Derives the output shape: equal to the operands, except along `axis` where the extents add.
    pub fn compute_output_shape(&self) -> Result<Vec<usize>, Error> {
        let (a, b) = (&self.input_a_shape, &self.input_b_shape);
        if a.len() != b.len() {
            return Err(invalid(
                "Join",
                format!("operand ranks differ: {} vs {}", a.len(), b.len()),
            ));
        }
        if self.axis >= a.len() {
            return Err(invalid(
                "Join",
                format!("axis {} out of range for rank {}", self.axis, a.len()),
            ));
        }
        let mut output = Vec::with_capacity(a.len());
        for (i, (&x, &y)) in a.iter().zip(b).enumerate() {
            if i == self.axis {
                output.push(x + y);
            } else if x == y {
                output.push(x);
            } else {
                return Err(invalid(
                    "Join",
                    format!("operands differ in dimension {i}: {x} vs {y}"),
                ));
            }
        }
        Ok(output)
    }

    /// Checks that the declared output shape matches the derived one.
    pub fn verify(&self) -> Result<(), Error> {
        let expected = self.compute_output_shape()?;
        if expected == self.output_shape {
            Ok(())
        } else {
            Err(invalid(
                "Join",
                format!(
                    "declared output shape {:?}, expected {expected:?}",
                    self.output_shape
                ),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn flatten_dimensions() {
        let dims = TensorDimensions::new([2, 3, 4]);
        assert_eq!(dims.flatten(0), Some(TensorDimensions::new([1, 24])));
        assert_eq!(dims.flatten(1), Some(TensorDimensions::new([2, 12])));
        assert_eq!(dims.flatten(3), Some(TensorDimensions::new([24, 1])));
        assert_eq!(dims.flatten(4), None);
    }

    #[test]
    fn conv2d_output_shape() {
        // LeNet-style first layer: 1x28x28 input, 5x5 kernel, stride 2, padding 1.
        let op = Conv2DOp {
            input_shape: [1, 28, 28],
            kernel_shape: [5, 1, 5, 5],
            output_shape: [5, 13, 13],
            dilations: [1, 1],
            pads: [1, 1, 0, 0],
            strides: [2, 2],
        };
        assert_eq!(op.compute_output_shape().unwrap(), [5, 13, 13]);
        op.verify().unwrap();
        assert_eq!(op.bias_shape(), [5]);
    }

    #[test]
    fn conv2d_rejects_channel_mismatch() {
        let op = Conv2DOp {
            input_shape: [3, 8, 8],
            kernel_shape: [4, 1, 3, 3],
            output_shape: [4, 6, 6],
            dilations: [1, 1],
            pads: [0; 4],
            strides: [1, 1],
        };
        let err = op.verify().unwrap_err();
        assert!(err.to_string().contains("Conv2D"));
    }

    #[test]
    fn gemm_transposes() {
        let op = GemmOp {
            input_a_shape: [4, 3],
            input_b_shape: [5, 4],
            output_shape: [3, 5],
            transpose_a: true,
            transpose_b: true,
        };
        assert_eq!(op.dimensions().unwrap(), [3, 4, 5]);
        op.verify().unwrap();
        let bad = GemmOp {
            transpose_b: false,
            ..op
        };
        assert!(bad.verify().is_err());
    }

    #[test]
    fn hamm_requires_equal_shapes() {
        let op = HammOp {
            input_a_shape: [2, 2],
            input_b_shape: [2, 2],
            output_shape: [2, 2],
        };
        op.verify().unwrap();
        let bad = HammOp {
            input_b_shape: [2, 1],
            ..op
        };
        assert!(bad.verify().is_err());
    }

    #[test]
    fn pooling_output_shape() {
        let op = MaxPoolOp {
            input_shape: [16, 8, 8],
            output_shape: [16, 4, 4],
            kernel_shape: [2, 2],
            strides: [2, 2],
            pads: [0; 4],
        };
        op.verify().unwrap();
        let avg = AveragePoolOp {
            input_shape: [16, 8, 8],
            output_shape: [16, 3, 3],
            kernel_shape: [3, 3],
            strides: [2, 2],
            pads: [0; 4],
        };
        avg.verify().unwrap();
        let too_large = MaxPoolOp {
            kernel_shape: [9, 9],
            ..op
        };
        assert!(too_large.compute_output_shape().is_err());
        // padding makes room for the same kernel
        let padded = MaxPoolOp {
            pads: [1, 1, 0, 0],
            ..too_large
        };
        assert_eq!(padded.compute_output_shape().unwrap(), [16, 1, 1]);
    }

    #[test]
    fn padded_average_pooling() {
        let op = AveragePoolOp {
            input_shape: [3, 8, 8],
            output_shape: [3, 4, 4],
            kernel_shape: [3, 3],
            strides: [2, 2],
            pads: [1, 1, 1, 1],
        };
        op.verify().unwrap();
        let unpadded = AveragePoolOp {
            pads: [0; 4],
            ..op
        };
        assert_eq!(unpadded.compute_output_shape().unwrap(), [3, 3, 3]);
        assert!(unpadded.verify().is_err());
    }

    #[test]
    fn join_along_axis() {
        let op = JoinOp {
            input_a_shape: vec![2, 3],
            input_b_shape: vec![2, 5],
            output_shape: vec![2, 8],
            axis: 1,
        };
        op.verify().unwrap();
        let wrong_axis = JoinOp { axis: 0, ..op };
        assert!(wrong_axis.verify().is_err());
    }

    proptest! {
        #[test]
        fn flatten_preserves_elements(shape in prop::collection::vec(1_usize..6, 0..5), axis in 0_usize..5) {
            let dims = TensorDimensions::new(shape);
            match dims.flatten(axis) {
                Some(flat) => {
                    prop_assert_eq!(flat.rank(), 2);
                    prop_assert_eq!(flat.num_elements(), dims.num_elements());
                }
                None => prop_assert!(axis > dims.rank()),
            }
        }

        #[test]
        fn unpadded_stride_one_conv_shrinks_by_kernel(
            channels in 1_usize..4,
            size in 3_usize..16,
            kernel in 1_usize..4,
        ) {
            let op = Conv2DOp {
                input_shape: [channels, size, size],
                kernel_shape: [2, channels, kernel, kernel],
                output_shape: [2, size - kernel + 1, size - kernel + 1],
                dilations: [1, 1],
                pads: [0; 4],
                strides: [1, 1],
            };
            prop_assert!(op.verify().is_ok());
        }
    }
}
