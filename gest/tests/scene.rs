use cgmath::vec3;
use gest::*;

const TRIANGLE_OBJ: &str = "\
# one triangle, drawn from both sides
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
f 3/3/1 2/2/1 1/1/1
";

fn assets() -> MemoryAssets {
    let mut assets = MemoryAssets::new();
    assets.insert("tri.obj", TRIANGLE_OBJ);
    assets
}

fn anim_frames(count: u32) -> String {
    (0..count)
        .map(|i| format!("set entityanim {} 0 {} 2 10 0 0 -1 0 1 0 1 1 1\n", i, i))
        .collect()
}

fn base_scene(frames: u32) -> String {
    let mut scene = String::from(
        "define camera cam 0\n\
         set 0 proj 60 1 0.1 100\n\
         define model tri\n\
         define entity tri 1\n\
         define entity gpu_text 2\n",
    );
    scene.push_str(&anim_frames(frames));
    scene
}

fn particle_scene(frames: u32, begin: i32, end: i32, lifetime: i32) -> String {
    let mut scene = base_scene(frames);
    scene.push_str(&format!(
        "define curve path\n\
         set curve path 0 AUTO AUTO 0 0 0 1 0 0 0 0 0\n\
         set curve path 1 AUTO AUTO 2 0 0 3 0 0 3 0 0\n\
         define particles swarm\n\
         set particles swarm 999 {} {} {} 1 0.5 path\n\
         set particlesmodel swarm tri\n",
        begin, end, lifetime
    ));
    scene
}

#[test]
fn test_parse_obj() {
    let geometry = parse_obj("tri", TRIANGLE_OBJ).unwrap();
    assert_eq!(geometry.vertices.len(), 3);
    assert_eq!(geometry.indices, vec![0, 1, 2, 2, 1, 0]);
    assert_eq!(geometry.vertices[1].position, [1.0, 0.0, 0.0]);
    assert_eq!(geometry.vertices[1].normal, [0.0, 0.0, 1.0]);
    assert_eq!(geometry.vertices[1].tex_coord, [1.0, 1.0]);
}

#[test]
fn test_parse_obj_index_out_of_range() {
    let source = "v 0 0 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 1/1/1 2/1/1\n";
    match parse_obj("broken", source) {
        Err(SceneError::Obj { model, line, .. }) => {
            assert_eq!(model, "broken");
            assert_eq!(line, 4);
        }
        other => panic!("unexpected {:?}", other.map(|g| g.indices)),
    }
}

#[test]
fn test_parse_obj_skips_unsupported_faces() {
    let source = format!(
        "{}v 1 1 0\nf 1/1/1 2/2/1 4/1/1 3/3/1\nf 1//1 2//1 3//1\nf 1 2 3\n",
        TRIANGLE_OBJ
    );
    let geometry = parse_obj("mixed", &source).unwrap();
    assert_eq!(geometry.vertices.len(), 3);
    assert_eq!(geometry.indices, vec![0, 1, 2, 2, 1, 0]);
}

#[test]
fn test_parse_line() {
    assert_eq!(
        parse_line("define camera cam 3"),
        Some(SceneCommand::DefineCamera {
            name: "cam".to_string(),
            handle: 3
        })
    );
    assert_eq!(
        parse_line("set 4 prop int speed 12"),
        Some(SceneCommand::Prop {
            handle: 4,
            kind: "int".to_string(),
            key: "speed".to_string(),
            value: "12".to_string()
        })
    );
    match parse_line("set entityanim 5 0 1 2 3 0 0 -1 0 1 0 2 2 2") {
        Some(SceneCommand::AnimFrame { frame, pose }) => {
            assert_eq!(frame, 5);
            assert_eq!(pose.handle, 0);
            assert_eq!(pose.pos, vec3(1.0, 2.0, 3.0));
            assert_eq!(pose.scale, vec3(2.0, 2.0, 2.0));
        }
        other => panic!("unexpected {:?}", other),
    }
    match parse_line("set 1 orthoproj 1 1 80 24") {
        Some(SceneCommand::Orthographic { handle, right, .. }) => {
            assert_eq!(handle, 1);
            assert_eq!(right, 24.0);
        }
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(parse_line(""), None);
    assert_eq!(parse_line("# comment"), None);
    assert_eq!(parse_line("set 4 prop vec speed 12"), None);
    assert_eq!(parse_line("set 0 proj 60 1.5 0.1"), None);
    assert_eq!(parse_line("define camera cam notanumber"), None);
}

#[test]
fn test_world_parse() {
    let world = World::parse(&assets(), &base_scene(10), 100).unwrap();
    assert_eq!(world.total_frames(), 10);
    assert_eq!(world.entities.len(), 3);
    assert_eq!(world.render_models.len(), 1);
    assert!(!world.entities[0].renderable);
    assert!(world.entities[1].renderable);
    assert!(world.camera().is_some());
    assert!(world.light().is_none());
    assert!(world.skybox.is_none());
}

#[test]
fn test_missing_texture_is_white() {
    let world = World::parse(&assets(), &base_scene(1), 1).unwrap();
    let texture = &world.render_models[0].texture;
    assert_eq!((texture.width, texture.height), (1, 1));
    assert_eq!(texture.pixels, vec![0xff; 4]);
}

#[test]
fn test_signature_entity_required() {
    let scene = base_scene(3).replace("define entity gpu_text 2\n", "");
    match World::parse(&assets(), &scene, 1) {
        Err(SceneError::NotGenuine(0)) => {}
        other => panic!("unexpected {:?}", other.err()),
    }

    let scene = format!("{}define entity gpu_text 3\n", base_scene(3));
    match World::parse(&assets(), &scene, 1) {
        Err(SceneError::NotGenuine(2)) => {}
        other => panic!("unexpected {:?}", other.err()),
    }
}

#[test]
fn test_scene_errors() {
    let assets = assets();

    match World::parse(&assets, &base_scene(0), 1) {
        Err(SceneError::NoAnimationFrames) => {}
        other => panic!("unexpected {:?}", other.err()),
    }

    let scene = format!("{}set 9 scale 1 1 1\n", base_scene(2));
    match World::parse(&assets, &scene, 1) {
        Err(SceneError::UndefinedHandle(9)) => {}
        other => panic!("unexpected {:?}", other.err()),
    }

    let scene = format!(
        "{}set entityanim 1 7 0 0 0 0 0 -1 0 1 0 1 1 1\n",
        base_scene(2)
    );
    match World::parse(&assets, &scene, 1) {
        Err(SceneError::UndefinedHandle(7)) => {}
        other => panic!("unexpected {:?}", other.err()),
    }

    let scene = format!(
        "{}define particles swarm\nset particles swarm 10 0 5 20 1 0 nowhere\n",
        base_scene(2)
    );
    match World::parse(&assets, &scene, 1) {
        Err(SceneError::UndefinedCurve(name)) => assert_eq!(name, "nowhere"),
        other => panic!("unexpected {:?}", other.err()),
    }

    let scene = format!("{}set particlesmodel ghosts tri\n", base_scene(2));
    match World::parse(&assets, &scene, 1) {
        Err(SceneError::UndefinedParticles(name)) => assert_eq!(name, "ghosts"),
        other => panic!("unexpected {:?}", other.err()),
    }

    let scene = format!("{}define model missing\n", base_scene(2));
    match World::parse(&assets, &scene, 1) {
        Err(SceneError::Asset(AssetError::NotFound(name))) => assert_eq!(name, "missing.obj"),
        other => panic!("unexpected {:?}", other.err()),
    }
}

#[test]
fn test_fps_all_frames_shown() {
    let mut world = World::parse(&assets(), &base_scene(10), 1).unwrap();
    for i in 0..10u64 {
        assert!(world.update_at(i * FRAME_DURATION_US), "frame {}", i);
        assert_eq!(world.curr_frame(), i as u32);
    }
    assert!(!world.is_done());
    assert!(!world.update_at(10 * FRAME_DURATION_US));
    assert!(world.is_done());
    assert_eq!(world.frames_shown(), 10);
    assert_eq!(world.fps(), 60.0);

    assert!(!world.update_at(11 * FRAME_DURATION_US));
    assert_eq!(world.fps(), 60.0);
}

#[test]
fn test_fps_with_dropped_frames() {
    let mut world = World::parse(&assets(), &base_scene(10), 1).unwrap();
    for i in (0..10u64).step_by(2) {
        assert!(world.update_at(i * FRAME_DURATION_US));
    }
    assert!(!world.update_at(10 * FRAME_DURATION_US));
    assert!(world.is_done());
    assert_eq!(world.frames_shown(), 5);
    assert!((world.fps() - 30.0).abs() < 1e-4);
}

#[test]
fn test_frame_shown_once() {
    let mut world = World::parse(&assets(), &base_scene(10), 1).unwrap();
    assert!(world.update_at(0));
    assert!(!world.update_at(FRAME_DURATION_US / 2));
    assert_eq!(world.frames_shown(), 1);
    assert!(world.update_at(FRAME_DURATION_US));
    assert_eq!(world.entities[0].pos, vec3(1.0, 2.0, 10.0));
}

#[test]
fn test_time_until_next_frame() {
    let mut world = World::parse(&assets(), &base_scene(10), 1).unwrap();
    assert_eq!(world.micros_until_next_frame_at(0), FRAME_DURATION_US);

    assert!(world.update_at(500));
    assert_eq!(world.micros_until_next_frame_at(500), FRAME_DURATION_US);
    assert_eq!(world.micros_until_next_frame_at(600), FRAME_DURATION_US - 100);
    assert_eq!(
        world.micros_until_next_frame_at(500 + 3 * FRAME_DURATION_US + 7),
        FRAME_DURATION_US - 7
    );

    let wait = world.micros_until_next_frame_at(2000);
    assert!(!world.update_at(2000));
    assert!(world.update_at(2000 + wait));
    assert_eq!(world.curr_frame(), 1);
}

#[test]
fn test_reset_aspect_ratio() {
    let mut world = World::parse(&assets(), &base_scene(1), 1).unwrap();
    world.reset_aspect_ratio(1600, 800);
    assert_eq!(world.camera().map(|(_, info)| info.aspect), Some(2.0));
    world.reset_aspect_ratio(0, 800);
    assert_eq!(world.camera().map(|(_, info)| info.aspect), Some(2.0));
}

#[test]
fn test_particles_spawn_requested_count() {
    let mut world = World::parse(&assets(), &particle_scene(10, 0, 4, 100), 10).unwrap();
    assert_eq!(world.particle_systems["swarm"].count, 10);

    for i in 0..10u64 {
        world.update_at(i * FRAME_DURATION_US);
    }
    let swarm = &world.particle_systems["swarm"];
    assert_eq!(swarm.remaining(), 0);
    assert_eq!(swarm.live_particles().len(), 10);
    assert_eq!(world.entities.len(), 13);
    for &handle in swarm.live_particles() {
        let entity = &world.entities[handle as usize];
        assert!(entity.live);
        assert_eq!(entity.render_model, 0);
    }
}

#[test]
fn test_particles_expire() {
    let mut world = World::parse(&assets(), &particle_scene(10, 0, 0, 3), 4).unwrap();

    assert!(world.update_at(0));
    assert_eq!(world.entities.len(), 7);
    for i in 1..4u64 {
        world.update_at(i * FRAME_DURATION_US);
    }
    assert_eq!(world.entities.len(), 7);

    world.update_at(4 * FRAME_DURATION_US);
    assert_eq!(world.entities.len(), 3);
    assert!(world.particle_systems["swarm"].live_particles().is_empty());
}

#[test]
fn test_particle_handles_survive_staggered_deaths() {
    let mut world = World::parse(&assets(), &particle_scene(30, 0, 10, 5), 10).unwrap();
    let mut peak = 0;

    for i in 0..30u64 {
        assert!(world.update_at(i * FRAME_DURATION_US), "frame {}", i);
        let live = world.particle_systems["swarm"].live_particles().to_vec();
        assert_eq!(live.len() + 3, world.entities.len(), "frame {}", i);

        let mut sorted = live.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), live.len(), "frame {}", i);
        for &handle in live.iter() {
            assert!(handle >= 3 && (handle as usize) < world.entities.len());
            assert!(world.entities[handle as usize].live);
        }
        peak = peak.max(live.len());
    }

    assert!(peak > 0 && peak < 10);
    assert_eq!(world.particle_systems["swarm"].remaining(), 0);
    assert!(world.particle_systems["swarm"].live_particles().is_empty());
    assert_eq!(world.entities.len(), 3);
}

#[test]
fn test_particles_are_reproducible() {
    let positions = || {
        let mut world = World::parse(&assets(), &particle_scene(10, 0, 4, 100), 6).unwrap();
        for i in 0..6u64 {
            world.update_at(i * FRAME_DURATION_US);
        }
        world.entities.iter().map(|e| e.pos).collect::<Vec<_>>()
    };
    assert_eq!(positions(), positions());
}

#[test]
fn test_bezier_eval() {
    let mut curve = BezierCurve::new();
    assert_eq!(curve.eval_simple(0.5), vec3(0.0, 0.0, 0.0));

    curve.set_point(
        0,
        BezierPoint {
            left: vec3(-1.0, 0.0, 0.0),
            right: vec3(1.0, 0.0, 0.0),
            coord: vec3(0.0, 0.0, 0.0),
        },
    );
    assert_eq!(curve.eval_simple(0.7), vec3(0.0, 0.0, 0.0));

    curve.set_point(
        1,
        BezierPoint {
            left: vec3(2.0, 0.0, 0.0),
            right: vec3(4.0, 0.0, 0.0),
            coord: vec3(3.0, 0.0, 0.0),
        },
    );
    assert_eq!(curve.points().len(), 2);
    assert_eq!(curve.eval_simple(0.0), vec3(0.0, 0.0, 0.0));
    assert!((curve.eval_simple(0.5).x - 1.5).abs() < 1e-5);
    assert_eq!(curve.eval_simple(1.0), vec3(3.0, 0.0, 0.0));
    assert_eq!(curve.eval_simple(2.0), vec3(3.0, 0.0, 0.0));

    curve.precalc_arclengths(10);
    assert!((curve.eval_arclen(0.5).x - 1.5).abs() < 0.05);
    assert!((curve.eval_arclen(0.25).x - 0.75).abs() < 0.05);
}

fn key(x: f32, y: f32) -> Keyframe {
    Keyframe {
        curve_type: CurveType::from_name("BEZIER"),
        left_handle_type: KeyHandleType::from_name("AUTO_CLAMPED"),
        right_handle_type: KeyHandleType::from_name("AUTO_CLAMPED"),
        hlx: x - 1.0,
        hly: y,
        hrx: x + 1.0,
        hry: y,
        x,
        y,
    }
}

#[test]
fn test_action_curve() {
    let mut action = ActionCurve::new();
    assert_eq!(action.eval_at_frame(3, false), 0.0);

    action.add_key(key(10.0, 1.0));
    assert_eq!(action.eval_at_frame(3, false), 1.0);
    action.add_key(key(0.0, 0.0));
    assert_eq!(action.keyframes()[0].x, 0.0);

    assert!((action.eval_at_frame(5, false) - 0.5).abs() < 1e-5);
    assert_eq!(action.eval_at_frame(-3, false), 0.0);
    assert_eq!(action.eval_at_frame(20, false), 1.0);

    action.add_key(key(20.0, 3.0));
    assert_eq!(action.eval_at_frame(10, false), 1.0);
    assert!((action.eval_at_frame(10, true) - 1.0 / 3.0).abs() < 1e-5);
    assert_eq!(action.eval_at_frame(25, true), 1.0);
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(image::RgbaImage::new(width, height))
        .write_to(&mut bytes, image::ImageOutputFormat::Png)
        .unwrap();
    bytes
}

fn skybox_assets(faces: &[(u32, u32)]) -> MemoryAssets {
    let mut assets = assets();
    for (face, &(width, height)) in SKYBOX_FACES.iter().zip(faces) {
        assets.insert(&format!("{}/{}", SKYBOX_DIR, face), png(width, height));
    }
    assets
}

#[test]
fn test_skybox_load() {
    let assets = skybox_assets(&[(4, 4); 6]);
    let skybox = Skybox::load(&assets).unwrap();
    assert_eq!(skybox.size, 4);
    assert_eq!(skybox.faces.len(), 6);
    assert_eq!(skybox.faces[5].pixels.len(), 4 * 4 * 4);

    let world = World::parse(&assets, &base_scene(1), 1).unwrap();
    assert_eq!(world.skybox.map(|s| s.size), Some(4));
}

#[test]
fn test_skybox_needs_all_faces() {
    let assets = skybox_assets(&[(4, 4); 5]);
    assert!(Skybox::load(&assets).is_none());
    assert!(World::parse(&assets, &base_scene(1), 1).unwrap().skybox.is_none());
}

#[test]
fn test_skybox_faces_must_match() {
    let mut faces = [(4, 4); 6];
    faces[2] = (8, 8);
    assert!(Skybox::load(&skybox_assets(&faces)).is_none());

    faces[2] = (4, 2);
    assert!(Skybox::load(&skybox_assets(&faces)).is_none());

    let mut assets = skybox_assets(&[(4, 4); 6]);
    assets.insert(&format!("{}/{}", SKYBOX_DIR, SKYBOX_FACES[0]), "not a png");
    assert!(Skybox::load(&assets).is_none());
}

#[test]
fn test_bundled_scene_loads() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../assets");
    let assets = DirectoryAssets::new(dir);
    let world = World::load(&assets, 250).unwrap();
    assert!(world.total_frames() > 0);
    assert!(world.light().is_some());
    assert_eq!(world.particle_systems.len(), 1);
    assert_eq!(world.particle_systems.values().next().map(|p| p.count), Some(250));
}
