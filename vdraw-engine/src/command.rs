use std::collections::HashMap;
use std::ops::RangeInclusive;

use vdraw_core::geometry::{Bounds2D, ContainMode, Point2};

use crate::scene::Scene;

#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new(name: impl Into<String>, args: &[&str]) -> Self {
        Self {
            name: name.into(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse;
}

pub struct CommandContext<'a> {
    pub scene: &'a mut Scene,
    /// `pick` 未给出半径参数时使用的命中半径。
    pub pick_radius: f64,
}

pub struct CommandBus {
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
}

impl CommandBus {
    pub fn new() -> Self {
        let mut bus = Self {
            handlers: HashMap::new(),
        };
        bus.register(PickCommand);
        bus.register(WithinCommand);
        bus.register(BoundsCommand);
        bus.register(LayerVisibilityCommand { visible: false });
        bus.register(LayerVisibilityCommand { visible: true });
        bus
    }

    pub fn register<H: CommandHandler + 'static>(&mut self, handler: H) {
        self.handlers.insert(handler.name(), Box::new(handler));
    }

    pub fn dispatch(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        if let Some(handler) = self.handlers.get(request.name.as_str()) {
            handler.execute(request, context)
        } else {
            CommandResponse::err(format!("未知命令: {}", request.name))
        }
    }

    pub fn available_commands(&self) -> impl Iterator<Item = &&'static str> {
        self.handlers.keys()
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

fn numeric_args(
    request: &CommandRequest,
    range: RangeInclusive<usize>,
) -> Result<Vec<f64>, String> {
    if !range.contains(&request.args.len()) {
        return Err(format!(
            "{} 需要 {} 到 {} 个参数，实际 {}",
            request.name,
            range.start(),
            range.end(),
            request.args.len()
        ));
    }
    request
        .args
        .iter()
        .map(|arg| {
            arg.trim()
                .parse::<f64>()
                .map_err(|_| format!("无法解析数值参数: {arg}"))
        })
        .collect()
}

/// `pick x y [radius]`：列出命中点附近特征点的全部可见图形。
struct PickCommand;

impl CommandHandler for PickCommand {
    fn name(&self) -> &'static str {
        "pick"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let values = match numeric_args(request, 2..=3) {
            Ok(values) => values,
            Err(message) => return CommandResponse::err(message),
        };
        let radius = values.get(2).copied().unwrap_or(context.pick_radius);
        let hits = context.scene.hits(Point2::new(values[0], values[1]), radius);
        if hits.is_empty() {
            return CommandResponse::ok("未命中任何图形");
        }
        let listing: Vec<String> = hits
            .iter()
            .map(|hit| format!("{} {}#{}", hit.kind, hit.id, hit.feature))
            .collect();
        CommandResponse::ok(format!("命中 {} 个图形: {}", hits.len(), listing.join(", ")))
    }
}

/// `within x y w h [any|all]`：窗口选择。
struct WithinCommand;

impl CommandHandler for WithinCommand {
    fn name(&self) -> &'static str {
        "within"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let (numbers, mode) = match request.args.as_slice() {
            [numbers @ .., mode] if request.args.len() == 5 => {
                match mode.to_ascii_lowercase().as_str() {
                    "any" => (numbers, ContainMode::Any),
                    "all" => (numbers, ContainMode::All),
                    _ => return CommandResponse::err(format!("未知包含模式: {mode}")),
                }
            }
            numbers if numbers.len() == 4 => (numbers, ContainMode::Any),
            args => {
                return CommandResponse::err(format!(
                    "within 需要 4 或 5 个参数，实际 {}",
                    args.len()
                ));
            }
        };
        let window = CommandRequest {
            name: request.name.clone(),
            args: numbers.to_vec(),
        };
        let values = match numeric_args(&window, 4..=4) {
            Ok(values) => values,
            Err(message) => return CommandResponse::err(message),
        };
        let origin = Point2::new(values[0], values[1]);
        let area = Bounds2D::from_origin_size(origin, values[2], values[3]);
        let ids: Vec<&str> = context
            .scene
            .shapes_within(&area, mode)
            .into_iter()
            .map(|shape| shape.id())
            .collect();
        if ids.is_empty() {
            CommandResponse::ok("窗口内没有图形")
        } else {
            CommandResponse::ok(format!("窗口内 {} 个图形: {}", ids.len(), ids.join(", ")))
        }
    }
}

struct BoundsCommand;

impl CommandHandler for BoundsCommand {
    fn name(&self) -> &'static str {
        "bounds"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        match context.scene.visible_bounds() {
            Some(bounds) => CommandResponse::ok(format!(
                "可见范围: ({:.3}, {:.3}) - ({:.3}, {:.3})",
                bounds.min().x(),
                bounds.min().y(),
                bounds.max().x(),
                bounds.max().y()
            )),
            None => CommandResponse::ok("没有可见图形"),
        }
    }
}

/// `hide_layer n` / `show_layer n`。
struct LayerVisibilityCommand {
    visible: bool,
}

impl CommandHandler for LayerVisibilityCommand {
    fn name(&self) -> &'static str {
        if self.visible { "show_layer" } else { "hide_layer" }
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let layer = match request.args.as_slice() {
            [layer] => match layer.trim().parse::<i32>() {
                Ok(layer) => layer,
                Err(_) => return CommandResponse::err(format!("无法解析图层编号: {layer}")),
            },
            _ => return CommandResponse::err(format!("{} 需要 1 个参数", self.name())),
        };
        match context.scene.set_layer_visible(layer, self.visible) {
            Ok(()) if self.visible => CommandResponse::ok(format!("图层 {layer} 已显示")),
            Ok(()) => CommandResponse::ok(format!("图层 {layer} 已隐藏")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use vdraw_core::document::{Document, LineShape, RectShape, ShapeCommon};

    use super::*;

    fn scene() -> Scene {
        let mut document = Document::new();
        let mut frame = ShapeCommon::new("frame");
        frame.layer = 3;
        document.add_rect(
            RectShape::new(frame, Point2::new(0.0, 0.0), 20.0, 10.0).expect("valid rect"),
        );
        document.add_line(LineShape::new(
            ShapeCommon::new("axis"),
            Point2::new(2.0, 2.0),
            Point2::new(8.0, 2.0),
        ));
        Scene::with_document(document)
    }

    fn run(bus: &CommandBus, scene: &mut Scene, name: &str, args: &[&str]) -> CommandResponse {
        let mut context = CommandContext {
            scene,
            pick_radius: 1.0,
        };
        bus.dispatch(&CommandRequest::new(name, args), &mut context)
    }

    #[test]
    fn pick_lists_hits_with_feature_index() {
        let bus = CommandBus::new();
        let mut scene = scene();

        let response = run(&bus, &mut scene, "pick", &["8.5", "2"]);
        assert!(response.success);
        assert_eq!(
            response.message.as_deref(),
            Some("命中 1 个图形: line axis#2")
        );

        let response = run(&bus, &mut scene, "pick", &["19", "9", "2"]);
        assert_eq!(
            response.message.as_deref(),
            Some("命中 1 个图形: rect frame#3")
        );

        let response = run(&bus, &mut scene, "pick", &["x", "1"]);
        assert!(!response.success);
    }

    #[test]
    fn within_and_layer_commands_cooperate() {
        let bus = CommandBus::new();
        let mut scene = scene();

        let response = run(&bus, &mut scene, "within", &["0", "0", "10", "5", "all"]);
        assert_eq!(response.message.as_deref(), Some("窗口内 1 个图形: axis"));

        let response = run(&bus, &mut scene, "within", &["0", "0", "10", "5"]);
        assert_eq!(
            response.message.as_deref(),
            Some("窗口内 2 个图形: frame, axis")
        );

        assert!(run(&bus, &mut scene, "hide_layer", &["3"]).success);
        let response = run(&bus, &mut scene, "bounds", &[]);
        assert_eq!(
            response.message.as_deref(),
            Some("可见范围: (2.000, 2.000) - (8.000, 2.000)")
        );

        assert!(run(&bus, &mut scene, "show_layer", &["3"]).success);
        assert!(scene.is_layer_visible(3));

        assert!(!run(&bus, &mut scene, "hide_layer", &["9"]).success);
        assert!(!run(&bus, &mut scene, "within", &["0", "0", "1", "1", "some"]).success);

        let response = run(&bus, &mut scene, "within", &["0", "0", "1", "1", "all", "extra"]);
        assert!(!response.success);
        assert_eq!(
            response.message.as_deref(),
            Some("within 需要 4 或 5 个参数，实际 6")
        );
        assert!(!run(&bus, &mut scene, "within", &["0", "0", "1"]).success);
    }

    #[test]
    fn unknown_command_is_reported() {
        let bus = CommandBus::new();
        let mut scene = scene();
        let response = run(&bus, &mut scene, "zoom", &[]);
        assert!(!response.success);
        assert_eq!(bus.available_commands().count(), 5);
    }
}
