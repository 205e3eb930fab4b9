//! Demo: replays a scripted annotation session and prints the result.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), sia::SiaError> {
    use sia::{
        AnnotationKind, Canvas, ExternalAnnotation, Label, Modifiers, MouseButton, Point, SiaConfig,
    };

    let config = SiaConfig::default();
    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let labels = vec![
        Label::new(1, "car").with_color("#e6194b"),
        Label::new(2, "person").with_color("#3cb44b"),
    ];
    let mut canvas = Canvas::new(config, labels);
    canvas.set_image_size(Point::new(1920.0, 1080.0));
    canvas.set_container(Point::new(0.0, 40.0), Point::new(960.0, 540.0));
    canvas.load(
        vec![ExternalAnnotation::new(
            AnnotationKind::Point,
            vec![Point::new(0.5, 0.5)],
        )],
        vec![],
    );

    // Drag out a bounding box and label it
    canvas.set_tool(AnnotationKind::BBox);
    canvas.mouse_down(Point::new(100.0, 140.0), MouseButton::Right, Modifiers::NONE);
    canvas.mouse_move(Point::new(300.0, 240.0), Point::new(200.0, 100.0));
    canvas.mouse_up(Point::new(300.0, 240.0), MouseButton::Right);
    if let Some(id) = canvas.session().selected_id() {
        canvas.set_labels(id, vec![1]);
    }

    // Draw a triangle
    canvas.set_tool(AnnotationKind::Polygon);
    canvas.mouse_down(Point::new(500.0, 100.0), MouseButton::Right, Modifiers::NONE);
    canvas.mouse_move(Point::new(600.0, 100.0), Point::new(100.0, 0.0));
    canvas.mouse_down(Point::new(600.0, 100.0), MouseButton::Right, Modifiers::NONE);
    canvas.mouse_move(Point::new(550.0, 200.0), Point::new(-50.0, 100.0));
    canvas.double_click(Point::new(550.0, 200.0));

    // Move it, then take the move back
    canvas.mouse_down(Point::new(550.0, 130.0), MouseButton::Left, Modifiers::NONE);
    canvas.mouse_move(Point::new(580.0, 160.0), Point::new(30.0, 30.0));
    canvas.mouse_up(Point::new(580.0, 160.0), MouseButton::Left);
    canvas.key_down("z", Modifiers::CTRL);

    for event in canvas.drain_events() {
        println!("{}", serde_json::to_string(&event)?);
    }

    let annotations: Vec<ExternalAnnotation> = canvas
        .session()
        .annotations()
        .iter()
        .map(|a| a.to_external())
        .collect();
    println!("{}", serde_json::to_string_pretty(&annotations)?);
    Ok(())
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}
