use crate::*;
use bytemuck::{Pod, Zeroable};
use log::warn;
use std::collections::BTreeMap;

/// Interleaved vertex as consumed by the renderers.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Indexed triangle geometry.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

// (position, tex coord, normal), zero-based.
type VertexKey = (u32, u32, u32);

/// Parses the triangle subset of Wavefront OBJ (`v`, `vn`, `vt`, `f p/t/n ×3`).
///
/// Distinct index triples become distinct vertices, numbered in key order.
/// Texture coordinates are flipped vertically.
pub fn parse_obj(model: &str, source: &str) -> Result<Geometry, SceneError> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut tex_coords: Vec<[f32; 2]> = Vec::new();
    let mut faces: Vec<([VertexKey; 3], usize)> = Vec::new();

    let error = |line: usize, reason: String| SceneError::Obj {
        model: model.to_string(),
        line,
        reason,
    };

    for (i, line) in source.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                if let Some(v) = parse_floats::<_, 3>(tokens) {
                    positions.push(v);
                }
            }
            Some("vn") => {
                if let Some(n) = parse_floats::<_, 3>(tokens) {
                    normals.push(n);
                }
            }
            Some("vt") => {
                if let Some([u, v]) = parse_floats::<_, 2>(tokens) {
                    tex_coords.push([u, 1.0 - v]);
                }
            }
            Some("f") => {
                let corners: Vec<Option<VertexKey>> = tokens.map(parse_corner).collect();
                if corners.len() == 3 && corners.iter().all(Option::is_some) {
                    let mut keys = [(0, 0, 0); 3];
                    for (k, corner) in keys.iter_mut().zip(corners) {
                        *k = corner.unwrap_or_default();
                    }
                    faces.push((keys, i + 1));
                } else {
                    warn!(
                        "model '{}' line {}: skipping face that is not a v/vt/vn triangle",
                        model,
                        i + 1
                    );
                }
            }
            _ => {}
        }
    }

    let mut vertex_map: BTreeMap<VertexKey, Vertex> = BTreeMap::new();
    for (keys, line) in faces.iter() {
        for &(p, t, n) in keys.iter() {
            let position = *positions
                .get(p as usize)
                .ok_or_else(|| error(*line, format!("position index {} out of range", p + 1)))?;
            let tex_coord = *tex_coords
                .get(t as usize)
                .ok_or_else(|| error(*line, format!("texcoord index {} out of range", t + 1)))?;
            let normal = *normals
                .get(n as usize)
                .ok_or_else(|| error(*line, format!("normal index {} out of range", n + 1)))?;
            vertex_map.insert(
                (p, t, n),
                Vertex {
                    position,
                    normal,
                    tex_coord,
                },
            );
        }
    }

    let mut index_map: BTreeMap<VertexKey, u32> = BTreeMap::new();
    let mut vertices = Vec::with_capacity(vertex_map.len());
    for (i, (key, vertex)) in vertex_map.into_iter().enumerate() {
        index_map.insert(key, i as u32);
        vertices.push(vertex);
    }

    let index_map = &index_map;
    let indices = faces
        .iter()
        .flat_map(|(keys, _)| keys.iter().map(move |key| index_map[key]))
        .collect();

    Ok(Geometry { vertices, indices })
}

fn parse_floats<'a, I, const N: usize>(mut tokens: I) -> Option<[f32; N]>
where
    I: Iterator<Item = &'a str>,
{
    let mut out = [0.0; N];
    for slot in out.iter_mut() {
        *slot = tokens.next()?.parse().ok()?;
    }
    Some(out)
}

fn parse_corner(token: &str) -> Option<VertexKey> {
    let mut parts = token.split('/');
    let mut next = || -> Option<u32> {
        let index: u32 = parts.next()?.parse().ok()?;
        index.checked_sub(1)
    };
    let p = next()?;
    let t = next()?;
    let n = next()?;
    Some((p, t, n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_requires_all_three_indices() {
        assert_eq!(parse_corner("1/2/3"), Some((0, 1, 2)));
        assert_eq!(parse_corner("1//3"), None);
        assert_eq!(parse_corner("0/1/1"), None);
    }
}
