// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Grid file I/O: the native binary `.sdf` format and `.npy` export.
//!
//! The `.sdf` layout is little-endian: a 36-byte header of `i32 nx, ny, nz`
//! followed by the bounding box as `f32 min_xyz` and `f32 max_xyz` (with
//! `max = min + n * dx`), then `nx*ny*nz` f32 values written in the order
//! `for i { for j { for k { write(phi[i,j,k]) } } }`.

use std::io::{Read, Write};
use std::path::Path;

use ndarray::{Array3, ShapeBuilder};

use crate::error::{Result, SdfError};
use crate::grid::Grid3;

/// Supported grid file formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    /// Native binary SDF format.
    Sdf,
    /// NumPy .npy format.
    Npy,
}

/// Infer the file format from the extension.
pub fn infer_format(path: &Path) -> Result<FileFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("sdf") => Ok(FileFormat::Sdf),
        Some(ext) if ext.eq_ignore_ascii_case("npy") => Ok(FileFormat::Npy),
        Some(ext) => Err(SdfError::UnsupportedFileFormat(ext.to_string())),
        None => Err(SdfError::UnsupportedFileFormat("(no extension)".to_string())),
    }
}

/// Write a signed distance grid to the binary `.sdf` format.
///
/// Returns the number of interior (negative) cells, which the CLI reports
/// as a sanity statistic.
pub fn write_sdf(path: &Path, phi: &Grid3<f32>, min_box: [f32; 3], dx: f32) -> Result<usize> {
    let (nx, ny, nz) = phi.shape();
    let file = std::fs::File::create(path)?;
    let mut w = std::io::BufWriter::new(file);

    w.write_all(&(nx as i32).to_le_bytes())?;
    w.write_all(&(ny as i32).to_le_bytes())?;
    w.write_all(&(nz as i32).to_le_bytes())?;
    for &m in &min_box {
        w.write_all(&m.to_le_bytes())?;
    }
    let max_box = [
        min_box[0] + nx as f32 * dx,
        min_box[1] + ny as f32 * dx,
        min_box[2] + nz as f32 * dx,
    ];
    for &m in &max_box {
        w.write_all(&m.to_le_bytes())?;
    }

    let mut inside = 0usize;
    for i in 0..nx {
        for j in 0..ny {
            for k in 0..nz {
                let v = phi.get(i, j, k);
                if v < 0.0 {
                    inside += 1;
                }
                w.write_all(&v.to_le_bytes())?;
            }
        }
    }
    w.flush()?;
    Ok(inside)
}

fn read_i32(r: &mut impl Read) -> Result<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_f32(r: &mut impl Read) -> Result<f32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

/// Read a binary `.sdf` file back into a grid and its bounding box.
pub fn read_sdf(path: &Path) -> Result<(Grid3<f32>, [f32; 3], [f32; 3])> {
    let file = std::fs::File::open(path)?;
    let mut r = std::io::BufReader::new(file);

    let nx = read_i32(&mut r)?;
    let ny = read_i32(&mut r)?;
    let nz = read_i32(&mut r)?;
    if nx <= 0 || ny <= 0 || nz <= 0 {
        return Err(SdfError::InvalidSdfHeader(format!(
            "non-positive dimensions {}x{}x{}",
            nx, ny, nz
        )));
    }
    let (nx, ny, nz) = (nx as usize, ny as usize, nz as usize);

    let mut min_box = [0.0f32; 3];
    for m in &mut min_box {
        *m = read_f32(&mut r)?;
    }
    let mut max_box = [0.0f32; 3];
    for m in &mut max_box {
        *m = read_f32(&mut r)?;
    }

    let mut phi = Grid3::filled(nx, ny, nz, 0.0f32);
    for i in 0..nx {
        for j in 0..ny {
            for k in 0..nz {
                phi.set(i, j, k, read_f32(&mut r)?);
            }
        }
    }
    Ok((phi, min_box, max_box))
}

/// Save a grid to a `.npy` file with shape `(nx, ny, nz)`.
pub fn save_npy(path: &Path, phi: &Grid3<f32>) -> Result<()> {
    let (nx, ny, nz) = phi.shape();
    // The flat storage runs i fastest, which is Fortran order for the
    // (nx, ny, nz) shape.
    let arr = Array3::from_shape_vec((nx, ny, nz).f(), phi.as_slice().to_vec())
        .map_err(|e| SdfError::Other(format!("shape error: {}", e)))?;
    ndarray_npy::write_npy(path, &arr)
        .map_err(|e| SdfError::Other(format!("npy write error: {}", e)))?;
    Ok(())
}

/// Save a grid to a file, inferring the format from the extension.
///
/// Returns the interior cell count for `.sdf` output, `None` for formats
/// that do not report it.
pub fn save_grid(
    path: &Path,
    phi: &Grid3<f32>,
    min_box: [f32; 3],
    dx: f32,
) -> Result<Option<usize>> {
    match infer_format(path)? {
        FileFormat::Sdf => write_sdf(path, phi, min_box, dx).map(Some),
        FileFormat::Npy => save_npy(path, phi).map(|()| None),
    }
}
