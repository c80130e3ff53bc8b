// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::config::{RenderSettings, ShSettings};
use crate::core::error::{LumiereError, Result};
use crate::core::scene::{Drawable, RenderCommand, Scene, StaticDrawable};
use crate::emitters::light::{LightSet, LightSource};
use crate::math::constants::{ Float, Quaternionf, Vector3f };
use crate::math::transform::Transform;
use crate::sensors::perspective::{PerspectiveCamera, DEFAULT_FAR_CLIP, DEFAULT_FOV_Y_DEGREES, DEFAULT_NEAR_CLIP};
use crate::shapes::triangle_mesh::TriangleMesh;

pub const DEFAULT_WIDTH: usize = 640;
pub const DEFAULT_HEIGHT: usize = 480;
pub const DEFAULT_FRAMES: u32 = 16;

pub struct SceneDescription {
    pub scene: Scene,
    // Render commands only hold weak references; these keep the owners alive.
    pub drawables: Vec<Arc<dyn Drawable>>,
    pub camera: PerspectiveCamera,
    pub lights: LightSet,
    pub settings: RenderSettings,
    pub sh: ShSettings,
    pub width: usize,
    pub height: usize,
    pub frames: u32,
}

pub fn load_scene_with_settings<P: AsRef<Path>>(path: P) -> Result<SceneDescription> {
    let path = path.as_ref();
    let xml = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_scene(&xml, base_dir)
}

pub fn parse_scene(xml: &str, base_dir: &Path) -> Result<SceneDescription> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut defaults: HashMap<String, String> = HashMap::new();

    let mut settings = RenderSettings::default();
    let mut sh = ShSettings::default();
    let mut width = DEFAULT_WIDTH;
    let mut height = DEFAULT_HEIGHT;
    let mut frames = DEFAULT_FRAMES;
    let mut camera: Option<PerspectiveCamera> = None;
    let mut lights = LightSet::default();
    let mut drawables: Vec<Arc<dyn Drawable>> = Vec::new();
    let mut scene = Scene::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                match e.name().as_ref() {
                    b"default" => {
                        let attrs = read_attributes(&e, &HashMap::new());
                        if let (Some(k), Some(v)) = (attrs.get("name"), attrs.get("value")) {
                            defaults.insert(k.clone(), v.clone());
                        }
                    }
                    b"settings" => {
                        let attrs = read_attributes(&e, &defaults);
                        if let Some(v) = attrs.get("width") {
                            width = parse_usize(v)?;
                        }
                        if let Some(v) = attrs.get("height") {
                            height = parse_usize(v)?;
                        }
                        if let Some(v) = attrs.get("frames") {
                            frames = parse_u32(v)?;
                        }
                        if let Some(v) = attrs.get("accumulation") {
                            settings.use_accumulation = parse_bool(v)?;
                        }
                        if let Some(v) = attrs.get("max_bounces") {
                            settings.max_bounces = parse_u32(v)?;
                        }
                        if let Some(v) = attrs.get("seed") {
                            settings.seed = parse_u64(v)?;
                        }
                        if let Some(v) = attrs.get("bvh_max_leaf_size") {
                            settings.bvh_max_leaf_size = parse_usize(v)?.max(1);
                        }
                    }
                    b"sh" => {
                        let attrs = read_attributes(&e, &defaults);
                        if let Some(v) = attrs.get("bands") {
                            sh.bands = parse_usize(v)?;
                        }
                        if let Some(v) = attrs.get("samples") {
                            sh.sqrt_sample_count = parse_usize(v)?;
                        }
                        if let Some(v) = attrs.get("sun_cone") {
                            sh.sun_cone_degrees = parse_float(v)?;
                        }
                        if let Some(v) = attrs.get("offset") {
                            sh.transfer_offset = parse_float(v)?;
                        }
                        if let Some(v) = attrs.get("seed") {
                            sh.seed = parse_u64(v)?;
                        }
                    }
                    b"camera" => {
                        let attrs = read_attributes(&e, &defaults);
                        let origin = parse_vec3(attrs.get("origin").ok_or(LumiereError::MissingField("camera.origin"))?)?;
                        let target = parse_vec3(attrs.get("target").ok_or(LumiereError::MissingField("camera.target"))?)?;
                        let up = attrs.get("up").map(|v| parse_vec3(v)).transpose()?
                            .unwrap_or_else(|| Vector3f::new(0.0, 1.0, 0.0));
                        let fov = attrs.get("fov").map(|v| parse_float(v)).transpose()?.unwrap_or(DEFAULT_FOV_Y_DEGREES);
                        let near = attrs.get("near").map(|v| parse_float(v)).transpose()?.unwrap_or(DEFAULT_NEAR_CLIP);
                        let far = attrs.get("far").map(|v| parse_float(v)).transpose()?.unwrap_or(DEFAULT_FAR_CLIP);
                        camera = Some(PerspectiveCamera::new(origin, target, up, fov, near, far));
                    }
                    b"light" => {
                        let attrs = read_attributes(&e, &defaults);
                        lights.push(parse_light(&attrs)?);
                    }
                    b"shape" => {
                        let attrs = read_attributes(&e, &defaults);
                        let (owner, command) = parse_shape(&attrs, base_dir)?;
                        scene.add_command(command);
                        drawables.push(owner);
                    }
                    b"environment" => {
                        let attrs = read_attributes(&e, &defaults);
                        let color = parse_vec3(attrs.get("color").ok_or(LumiereError::MissingField("environment.color"))?)?;
                        scene.set_environment(Some(color));
                    }
                    b"scene" => {}
                    other => {
                        log::warn!("Ignoring unknown scene element <{}>", String::from_utf8_lossy(other));
                    }
                }
            }
            Err(e) => {
                return Err(LumiereError::SceneParse(e.to_string()));
            }
            _ => {}
        }

        buf.clear();
    }

    let camera = camera.ok_or(LumiereError::MissingField("camera"))?;
    log::info!("Loaded scene: {} shapes, {} lights, {}x{}", drawables.len(), lights.lights().len(), width, height);

    Ok(SceneDescription {
        scene,
        drawables,
        camera,
        lights,
        settings,
        sh,
        width,
        height,
        frames,
    })
}

fn read_attributes(e: &BytesStart<'_>, defaults: &HashMap<String, String>) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = resolve_value(&attr.unescape_value().unwrap_or_default(), defaults);
        attrs.insert(key, value);
    }
    attrs
}

fn parse_light(attrs: &HashMap<String, String>) -> Result<LightSource> {
    let name = attrs.get("name").cloned().unwrap_or_else(|| "light".to_string());
    let color = attrs.get("color").map(|v| parse_vec3(v)).transpose()?
        .unwrap_or_else(|| Vector3f::new(1.0, 1.0, 1.0));

    match attrs.get("type").map(String::as_str) {
        Some("directional") => {
            let rotation = attrs.get("rotation").map(|v| parse_euler_degrees(v)).transpose()?
                .unwrap_or_else(Quaternionf::identity);
            Ok(LightSource::directional(name, rotation, color))
        }
        Some("point") => {
            let position = parse_vec3(attrs.get("position").ok_or(LumiereError::MissingField("light.position"))?)?;
            let linear = attrs.get("linear").map(|v| parse_float(v)).transpose()?.unwrap_or(0.0);
            let quadratic = attrs.get("quadratic").map(|v| parse_float(v)).transpose()?.unwrap_or(1.0);
            Ok(LightSource::point(name, position, color, linear, quadratic))
        }
        Some(other) => Err(LumiereError::SceneParse(format!("unsupported light type: {}", other))),
        None => Err(LumiereError::MissingField("light.type")),
    }
}

fn parse_shape(attrs: &HashMap<String, String>, base_dir: &Path) -> Result<(Arc<dyn Drawable>, RenderCommand)> {
    let mesh = match (attrs.get("filename"), attrs.get("type").map(String::as_str)) {
        (Some(filename), _) => {
            let path = if Path::new(filename).is_absolute() {
                Path::new(filename).to_path_buf()
            } else {
                base_dir.join(filename)
            };
            TriangleMesh::from_obj(&path)?
        }
        (None, Some("sphere")) => {
            let radius = attrs.get("radius").map(|v| parse_float(v)).transpose()?.unwrap_or(1.0);
            let rings = attrs.get("rings").map(|v| parse_usize(v)).transpose()?.unwrap_or(16);
            let segments = attrs.get("segments").map(|v| parse_usize(v)).transpose()?.unwrap_or(32);
            TriangleMesh::uv_sphere(radius, rings, segments)
        }
        (None, Some("quad")) => {
            let half = attrs.get("half_extent").map(|v| parse_float(v)).transpose()?.unwrap_or(1.0);
            TriangleMesh::ground_quad(half)
        }
        (None, Some(other)) => {
            return Err(LumiereError::SceneParse(format!("unsupported shape type: {}", other)));
        }
        (None, None) => return Err(LumiereError::MissingField("shape.filename")),
    };

    let translate = attrs.get("translate").map(|v| parse_vec3(v)).transpose()?.unwrap_or_else(Vector3f::zeros);
    let scale = attrs.get("scale").map(|v| parse_vec3(v)).transpose()?
        .unwrap_or_else(|| Vector3f::new(1.0, 1.0, 1.0));
    let rotation = attrs.get("rotation").map(|v| parse_euler_degrees(v)).transpose()?
        .unwrap_or_else(Quaternionf::identity);
    let color = attrs.get("color").map(|v| parse_vec3(v)).transpose()?
        .unwrap_or_else(|| Vector3f::new(1.0, 1.0, 1.0));
    let name = attrs.get("name").cloned().unwrap_or_else(|| "shape".to_string());

    log::debug!("Shape '{}': {} vertices, {} triangles", name, mesh.vertices().len(), mesh.indices().len());
    let owner: Arc<dyn Drawable> = Arc::new(StaticDrawable::new(name, Transform::from_trs(&translate, &rotation, &scale)));
    let command = RenderCommand::new(&owner, mesh, color);
    Ok((owner, command))
}

fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

fn parse_float(value: &str) -> Result<Float> {
    value.trim().parse::<Float>().map_err(|_| LumiereError::SceneParse(format!("invalid float: {}", value)))
}

fn parse_u32(value: &str) -> Result<u32> {
    value.trim().parse::<u32>().map_err(|_| LumiereError::SceneParse(format!("invalid integer: {}", value)))
}

fn parse_u64(value: &str) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|_| LumiereError::SceneParse(format!("invalid integer: {}", value)))
}

fn parse_usize(value: &str) -> Result<usize> {
    value.trim().parse::<usize>().map_err(|_| LumiereError::SceneParse(format!("invalid integer: {}", value)))
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim() {
        "true" | "1" | "on" => Ok(true),
        "false" | "0" | "off" => Ok(false),
        _ => Err(LumiereError::SceneParse(format!("invalid boolean: {}", value))),
    }
}

fn parse_vec3(value: &str) -> Result<Vector3f> {
    let mut parts = value.split(',').map(|s| s.trim()).filter(|s| !s.is_empty());
    let x = parts.next().ok_or_else(|| LumiereError::SceneParse(format!("invalid vec3: {}", value)))?;
    let y = parts.next().ok_or_else(|| LumiereError::SceneParse(format!("invalid vec3: {}", value)))?;
    let z = parts.next().ok_or_else(|| LumiereError::SceneParse(format!("invalid vec3: {}", value)))?;
    Ok(Vector3f::new(parse_float(x)?, parse_float(y)?, parse_float(z)?))
}

// Euler angles in degrees about X, Y and Z.
fn parse_euler_degrees(value: &str) -> Result<Quaternionf> {
    let angles = parse_vec3(value)?.map(|a| a.to_radians());
    Ok(Quaternionf::from_euler_angles(angles.x, angles.y, angles.z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitters::light::LightKind;
    use std::io::Write;

    const SCENE: &str = r#"
        <scene>
            <default name="spp" value="8"/>
            <settings width="64" height="48" frames="$spp" accumulation="false" max_bounces="3" seed="7"/>
            <sh bands="2" samples="16" sun_cone="20"/>
            <camera origin="0, 1, 5" target="0, 0, 0" fov="60"/>
            <light type="directional" name="sun" rotation="90, 0, 0" color="1, 0.9, 0.8"/>
            <light type="point" name="lamp" position="1, 2, 3" linear="0.09" quadratic="0.032"/>
            <shape type="sphere" name="ball" radius="2" translate="0, 2, 0" color="0.8, 0.2, 0.2"/>
            <shape type="quad" name="floor" half_extent="10"/>
            <environment color="0.1, 0.2, 0.3"/>
        </scene>
    "#;

    #[test]
    fn test_parse_scene() {
        let desc = parse_scene(SCENE, Path::new(".")).expect("scene should parse");
        assert_eq!((desc.width, desc.height, desc.frames), (64, 48, 8));
        assert!(!desc.settings.use_accumulation);
        assert_eq!(desc.settings.max_bounces, 3);
        assert_eq!(desc.settings.seed, 7);
        assert_eq!(desc.sh.bands, 2);
        assert_eq!(desc.sh.sqrt_sample_count, 16);
        assert!((desc.sh.sun_cone_degrees - 20.0).abs() < 1e-6);

        assert_eq!(desc.camera.position(), Vector3f::new(0.0, 1.0, 5.0));
        assert!((desc.camera.fov_y_degrees() - 60.0).abs() < 1e-6);

        assert_eq!(desc.lights.lights().len(), 2);
        let sun = desc.lights.directional().expect("one sun").expect("sun present");
        // Rotating +Z by 90 degrees about X points it along -Y.
        assert!((sun.direction() - Vector3f::new(0.0, -1.0, 0.0)).norm() < 1e-5);
        let lamp = desc.lights.points().next().expect("lamp");
        assert_eq!(lamp.kind, LightKind::Point { linear: 0.09, quadratic: 0.032 });

        assert_eq!(desc.drawables.len(), 2);
        assert_eq!(desc.scene.commands().len(), 2);
        assert!(desc.scene.commands().iter().all(|c| c.is_alive()));
        assert_eq!(desc.drawables[0].name(), "ball");
        assert_eq!(desc.drawables[0].model_matrix()[(1, 3)], 2.0);
        assert_eq!(desc.scene.commands()[0].override_color(), Vector3f::new(0.8, 0.2, 0.2));
    }

    #[test]
    fn test_obj_shape_relative_to_scene_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut obj = fs::File::create(dir.path().join("tri.obj")).expect("obj file");
        writeln!(obj, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3").expect("write obj");

        let scene_path = dir.path().join("scene.xml");
        fs::write(&scene_path, r#"<scene>
            <camera origin="0, 0, 3" target="0, 0, 0"/>
            <shape name="tri" filename="tri.obj" scale="2, 2, 2"/>
        </scene>"#).expect("write scene");

        let desc = load_scene_with_settings(&scene_path).expect("scene should load");
        assert_eq!(desc.scene.commands().len(), 1);
        assert_eq!(desc.scene.commands()[0].mesh().indices().len(), 1);
        assert_eq!((desc.width, desc.height), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
        assert!(desc.lights.is_empty());
    }

    #[test]
    fn test_errors() {
        let missing_camera = "<scene><shape type=\"quad\"/></scene>";
        assert!(matches!(parse_scene(missing_camera, Path::new(".")), Err(LumiereError::MissingField("camera"))));

        let bad_float = "<scene><camera origin=\"0, x, 0\" target=\"0, 0, 0\"/></scene>";
        assert!(matches!(parse_scene(bad_float, Path::new(".")), Err(LumiereError::SceneParse(_))));

        let bad_light = "<scene><camera origin=\"0, 0, 1\" target=\"0, 0, 0\"/><light type=\"area\"/></scene>";
        assert!(matches!(parse_scene(bad_light, Path::new(".")), Err(LumiereError::SceneParse(_))));

        let missing_obj = "<scene><camera origin=\"0, 0, 1\" target=\"0, 0, 0\"/><shape filename=\"nope.obj\"/></scene>";
        assert!(parse_scene(missing_obj, Path::new("/nonexistent")).is_err());

        assert!(matches!(load_scene_with_settings("/nonexistent/scene.xml"), Err(LumiereError::Io(_))));
    }
}
