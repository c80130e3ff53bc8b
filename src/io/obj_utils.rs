// Copyright @yucwang 2023

use std::fs;
use std::path::Path;

use wavefront_obj::obj;

use crate::core::error::{LumiereError, Result};
use crate::math::constants::Vector3f;

// Flattened OBJ contents: global position/normal lists and triangle corner indices.
#[derive(Debug, Default)]
pub struct ObjGeometry {
    pub positions: Vec<Vector3f>,
    pub normals: Vec<Vector3f>,
    pub faces: Vec<[ObjCorner; 3]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjCorner {
    pub position: usize,
    pub normal: Option<usize>,
}

pub fn load_obj_from_str<S: AsRef<str>>(input: S) -> Result<ObjGeometry> {
    let obj_set = obj::parse(triangulate_faces(input.as_ref()))
        .map_err(|e| LumiereError::ObjParse(e.to_string()))?;

    let mut geometry = ObjGeometry::default();
    for object in obj_set.objects {
        // Object-local indices are rebased onto the flattened lists.
        let position_base = geometry.positions.len();
        let normal_base = geometry.normals.len();
        geometry.positions.extend(object.vertices.iter().map(|v| Vector3f::new(v.x as f32, v.y as f32, v.z as f32)));
        geometry.normals.extend(object.normals.iter().map(|n| Vector3f::new(n.x as f32, n.y as f32, n.z as f32)));

        for geom in object.geometry {
            for shape in geom.shapes {
                if let obj::Primitive::Triangle(a, b, c) = shape.primitive {
                    let corner = |vtn: obj::VTNIndex| ObjCorner {
                        position: position_base + vtn.0,
                        normal: vtn.2.map(|n| normal_base + n),
                    };
                    geometry.faces.push([corner(a), corner(b), corner(c)]);
                }
            }
        }
    }

    Ok(geometry)
}

pub fn load_obj_from_file<P: AsRef<Path>>(path: P) -> Result<ObjGeometry> {
    let data = fs::read_to_string(path.as_ref())?;
    log::info!("Loading OBJ: {}", path.as_ref().display());
    load_obj_from_str(data)
}

// The parser only accepts triangles, so polygons are fanned around their first corner.
fn triangulate_faces(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 4);
    for line in input.lines() {
        let mut parts = line.split_whitespace();
        if parts.next() == Some("f") {
            let corners: Vec<&str> = parts.collect();
            if corners.len() > 3 {
                for pair in corners[1..].windows(2) {
                    out.push_str(&format!("f {} {} {}\n", corners[0], pair[0], pair[1]));
                }
                continue;
            }
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // The parser may hand corners back cyclically shifted; start each face at its lowest index.
    fn positions_in_winding_order(face: &[ObjCorner; 3]) -> [usize; 3] {
        let p = [face[0].position, face[1].position, face[2].position];
        let first = (0..3).min_by_key(|&i| p[i]).unwrap_or(0);
        [p[first], p[(first + 1) % 3], p[(first + 2) % 3]]
    }

    fn face_normal(geometry: &ObjGeometry, face: &[ObjCorner; 3]) -> Vector3f {
        let [a, b, c] = (*face).map(|corner| geometry.positions[corner.position]);
        (b - a).cross(&(c - a)).normalize()
    }

    #[test]
    fn test_load_obj_from_str_basic() {
        let input = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";
        let geometry = load_obj_from_str(input).expect("failed to parse obj");
        assert_eq!(geometry.positions.len(), 3);
        assert_eq!(geometry.faces.len(), 1);
        assert_eq!(positions_in_winding_order(&geometry.faces[0]), [0, 1, 2]);
        assert!(geometry.faces[0].iter().all(|c| c.normal.is_none()));
        assert!((face_normal(&geometry, &geometry.faces[0]) - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_quads_are_fan_triangulated() {
        let input = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
f 1//1 2//1 3//1 4//1
";
        let geometry = load_obj_from_str(input).expect("failed to parse obj");
        assert_eq!(geometry.faces.len(), 2);
        assert_eq!(positions_in_winding_order(&geometry.faces[0]), [0, 1, 2]);
        assert_eq!(positions_in_winding_order(&geometry.faces[1]), [0, 2, 3]);
        for face in &geometry.faces {
            assert!(face.iter().all(|c| c.normal == Some(0)));
            assert!((face_normal(&geometry, face) - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-6);
        }
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(matches!(load_obj_from_str("v 0.0 zero 1.0\n"), Err(LumiereError::ObjParse(_))));
    }
}
