use rigid_sandbox::render::DrawCommand;
use rigid_sandbox::*;

const FRAMES: usize = 300;

fn main() -> Result<()> {
    let mut sandbox = Sandbox::new(SandboxConfig::default())?;
    let mut list = DrawList::new();

    // Grab the ball from the top of the scene and sling it sideways.
    let width = sandbox.config().viewport_width;
    let height = sandbox.config().viewport_height;
    let ball = Vec2::new(width / 2.0, -height / 2.0 + 20.0);

    for frame in 0..FRAMES {
        let events: Vec<PointerEvent> = match frame {
            0 => vec![PointerEvent::Moved(ball), PointerEvent::Pressed],
            1..=59 => vec![PointerEvent::Moved(ball + Vec2::new(frame as f32 * 2.0, 0.0))],
            60 => vec![PointerEvent::Released],
            _ => Vec::new(),
        };

        list.clear();
        let report = sandbox.frame(events, &mut list);
        if report.removed() > 0 {
            println!("frame {frame}: removed {} objects", report.removed());
        }
        if frame % 60 == 0 {
            let dots = list
                .iter()
                .filter(|command| matches!(command, DrawCommand::Dot { .. }))
                .count();
            let profile = sandbox.world().last_profile();
            println!(
                "frame {frame}: {} primitives ({dots} dots), {} awake of {} bodies, {} contacts, dragging = {}",
                list.len(),
                profile.awake_body_count,
                profile.body_count,
                profile.contact_count,
                sandbox.drag().is_dragging()
            );
        }
    }

    let report = sandbox.destroy_all();
    println!(
        "Teardown: {} shapes, {} constraints, {} bodies removed",
        report.shapes, report.constraints, report.bodies
    );
    Ok(())
}
