//! The inverse discrete cosine transform.
//!
//! The 2-D 8x8 IDCT is separable: applying the 1-D inverse transform to
//! every row, then to every column of the result, is mathematically
//! equivalent to the direct 4-nested-loop formula below but costs O(N^3)
//! multiplications instead of O(N^4). We use the direct formula in tests
//! as a correctness oracle for the separable pass.

use std::f32::consts::PI;

/// Inverse DCT of an 8x8 block of dequantized coefficients, in place, in
/// natural (row-major) order.
///
/// Runs the separable 1-D transform on rows, then on columns.
pub fn idct_block(block: &mut [i32; 64]) {
    let mut floats = [0f32; 64];
    for (dst, &src) in floats.iter_mut().zip(block.iter()) {
        *dst = src as f32;
    }

    let mut rows = [0f32; 64];
    for r in 0..8 {
        idct_1d(&floats[r * 8..r * 8 + 8], &mut rows[r * 8..r * 8 + 8]);
    }

    let mut columns = [0f32; 64];
    for c in 0..8 {
        let mut column_in = [0f32; 8];
        for r in 0..8 {
            column_in[r] = rows[r * 8 + c];
        }
        let mut column_out = [0f32; 8];
        idct_1d(&column_in, &mut column_out);
        for r in 0..8 {
            columns[r * 8 + c] = column_out[r];
        }
    }

    for (dst, &src) in block.iter_mut().zip(columns.iter()) {
        *dst = src.round() as i32;
    }
}

/// The 1-D, 8-point inverse DCT-III used for both the row and column pass:
///
/// `out[x] = 1/2 * sum_{u=0}^{7} C(u) * in[u] * cos((2x+1) * u * PI / 16)`
///
/// with `C(0) = 1/sqrt(2)` and `C(u) = 1` for `u > 0`.
fn idct_1d(input: &[f32; 8], output: &mut [f32; 8]) {
    for (x, out) in output.iter_mut().enumerate() {
        let mut sum = 0f32;
        for (u, &coeff) in input.iter().enumerate() {
            let cu = if u == 0 { std::f32::consts::FRAC_1_SQRT_2 } else { 1.0 };
            sum += cu * coeff * (((2 * x + 1) as f32 * u as f32 * PI) / 16.0).cos();
        }
        *out = sum * 0.5;
    }
}

/// Direct 4-nested-loop reference IDCT: the textbook formula with no
/// separability shortcut. Used only in tests, to check the separable
/// implementation against ground truth.
#[cfg(test)]
fn idct_block_direct(block: &[i32; 64]) -> [i32; 64] {
    let mut output = [0f32; 64];

    for y in 0..8 {
        for x in 0..8 {
            let mut sum = 0f32;
            for v in 0..8 {
                for u in 0..8 {
                    let cu = if u == 0 { std::f32::consts::FRAC_1_SQRT_2 } else { 1.0 };
                    let cv = if v == 0 { std::f32::consts::FRAC_1_SQRT_2 } else { 1.0 };
                    let coeff = block[v * 8 + u] as f32;
                    sum += cu * cv
                        * coeff
                        * (((2 * x + 1) as f32 * u as f32 * PI) / 16.0).cos()
                        * (((2 * y + 1) as f32 * v as f32 * PI) / 16.0).cos();
                }
            }
            output[y * 8 + x] = sum * 0.25;
        }
    }

    let mut rounded = [0i32; 64];
    for (dst, &src) in rounded.iter_mut().zip(output.iter()) {
        *dst = src.round() as i32;
    }
    rounded
}
