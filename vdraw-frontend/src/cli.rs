use std::path::Path;

use tracing::info;
use vdraw_config::{AppConfig, OutputFormat};
use vdraw_core::document::{ShapeCommon, ShapeRef};
use vdraw_core::geometry::Point2;
use vdraw_engine::command::{CommandBus, CommandContext, CommandRequest};
use vdraw_io::JsonFacade;

use crate::errors::FrontendError;
use crate::loader::{DocumentSource, LoadedScene, load_scene};

/// 命令行一次运行的选项，`output` 为空时使用配置中的默认输出。
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub output: Option<OutputFormat>,
    pub pick: Option<(f64, f64)>,
    pub within: Option<[f64; 4]>,
}

/// 加载图纸，按所选格式打印，再依次执行命中测试与窗口选择。
pub fn run(input: &Path, options: &CliOptions, config: &AppConfig) -> Result<(), FrontendError> {
    let loaded = load_scene(input, config)?;
    let output = options.output.unwrap_or(config.frontend.default_output);
    info!(?output, "输出图纸");
    match output {
        OutputFormat::Json => {
            let text = JsonFacade::new()
                .to_json(loaded.scene.document())
                .map_err(|err| FrontendError::Render(err.to_string()))?;
            println!("{text}");
        }
        OutputFormat::Summary => println!("{}", render_summary(&loaded)),
    }

    let mut scene = loaded.scene;
    let bus = CommandBus::new();
    let mut context = CommandContext {
        scene: &mut scene,
        pick_radius: config.frontend.pick_radius,
    };
    if let Some((x, y)) = options.pick {
        dispatch_cli_command(&bus, "pick", vec![x.to_string(), y.to_string()], &mut context)?;
    }
    if let Some(window) = options.within {
        let args = window.iter().map(|value| value.to_string()).collect();
        dispatch_cli_command(&bus, "within", args, &mut context)?;
    }
    Ok(())
}

fn dispatch_cli_command(
    bus: &CommandBus,
    name: &str,
    args: Vec<String>,
    context: &mut CommandContext<'_>,
) -> Result<(), FrontendError> {
    let request = CommandRequest {
        name: name.to_string(),
        args,
    };
    let response = bus.dispatch(&request, context);
    if response.success {
        if let Some(message) = response.message {
            println!("[命令] {message}");
        }
        Ok(())
    } else {
        Err(FrontendError::Command {
            command: name.to_string(),
            message: response.message.unwrap_or_else(|| "未知错误".to_string()),
        })
    }
}

/// 生成图纸概览：来源、页面、图形列表与逐行错误。
pub fn render_summary(loaded: &LoadedScene) -> String {
    let document = loaded.scene.document();
    let page = document.page();
    let mut lines = Vec::new();

    match &loaded.source {
        DocumentSource::Dsl(path) => lines.push(format!("已从图纸描述加载：{}", path.display())),
        DocumentSource::Json(path) => lines.push(format!("已从 JSON 加载：{}", path.display())),
    }
    let units = if page.units.is_empty() {
        String::new()
    } else {
        format!(" {}", page.units)
    };
    lines.push(format!(
        "页面 {:.2} x {:.2}{units}, 网格={:.2}, 捕捉={:.2}, 比例=1:{}",
        page.width, page.height, page.grid, page.snap, page.scale
    ));
    lines.push(format!(
        "图形总数 {}（矩形 {}，线段 {}，椭圆 {}）",
        document.shape_count(),
        document.rects().len(),
        document.lines().len(),
        document.ellipses().len()
    ));
    for shape in document.shapes() {
        let visible = loaded.scene.is_layer_visible(shape.layer());
        lines.push(format!(
            "  - {}{}",
            describe_shape(shape),
            if visible { "" } else { " [隐藏]" }
        ));
    }

    if loaded.row_errors.is_empty() {
        lines.push("解析无错误。".to_string());
    } else {
        lines.push(format!("逐行错误 {} 条：", loaded.row_errors.len()));
        for row_error in &loaded.row_errors {
            lines.push(format!("  - {row_error}"));
        }
    }
    lines.join("\n")
}

fn describe_shape(shape: ShapeRef<'_>) -> String {
    match shape {
        ShapeRef::Rect(rect) => format!(
            "矩形 {}, 位置={}, 宽={:.2}, 高={:.2}, {}",
            rect.common.id,
            format_point(rect.location()),
            rect.width(),
            rect.height(),
            describe_common(&rect.common)
        ),
        ShapeRef::Line(line) => format!(
            "线段 {}, 起点={}, 终点={}, 端帽={}/{}, {}",
            line.common.id,
            format_point(line.start),
            format_point(line.end),
            line.start_cap.code(),
            line.end_cap.code(),
            describe_common(&line.common)
        ),
        ShapeRef::Ellipse(ellipse) => format!(
            "椭圆 {}, 中心={}, 宽={:.2}, 高={:.2}, {}",
            ellipse.common.id,
            format_point(ellipse.center()),
            ellipse.width(),
            ellipse.height(),
            describe_common(&ellipse.common)
        ),
    }
}

fn describe_common(common: &ShapeCommon) -> String {
    let mut text = format!(
        "Layer={}, 线色={}, 线宽={:.2}, 填充={}",
        common.layer, common.line_color, common.line_thickness, common.fill_color
    );
    if !common.text.is_empty() {
        text.push_str(&format!(", 文字=\"{}\"({})", common.text, common.text_align.code()));
    }
    text
}

fn format_point(point: Point2) -> String {
    format!("({:.2}, {:.2})", point.x(), point.y())
}
