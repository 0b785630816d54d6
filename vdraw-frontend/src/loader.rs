use std::path::{Path, PathBuf};

use tracing::{info, warn};
use vdraw_config::AppConfig;
use vdraw_engine::scene::Scene;
use vdraw_io::errors::RowError;
use vdraw_io::{DocumentLoader, DslFacade, JsonFacade};

use crate::errors::FrontendError;

/// 文档来源，便于前端呈现加载信息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Dsl(PathBuf),
    Json(PathBuf),
}

impl DocumentSource {
    /// 扩展名为 `.json`（不区分大小写）的文件按 JSON 读取，其余一律视为图纸描述语言。
    pub fn from_path(path: &Path) -> Self {
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            DocumentSource::Json(path.to_path_buf())
        } else {
            DocumentSource::Dsl(path.to_path_buf())
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            DocumentSource::Dsl(path) | DocumentSource::Json(path) => path,
        }
    }
}

/// 统一封装加载后的场景与元信息。
#[derive(Debug)]
pub struct LoadedScene {
    pub scene: Scene,
    pub source: DocumentSource,
    /// 仅图纸描述语言会产生逐行错误，JSON 加载时恒为空。
    pub row_errors: Vec<RowError>,
}

pub fn load_scene(path: &Path, config: &AppConfig) -> Result<LoadedScene, FrontendError> {
    let source = DocumentSource::from_path(path);
    let (document, row_errors) = match &source {
        DocumentSource::Json(path) => (JsonFacade::new().load(path)?, Vec::new()),
        DocumentSource::Dsl(path) => {
            let report = DslFacade::new().load_report(path)?;
            (report.document, report.errors)
        }
    };
    info!(
        path = %path.display(),
        shapes = document.shape_count(),
        "文档加载完成"
    );

    let mut scene = Scene::with_document(document);
    for &layer in &config.layers.hidden {
        if let Err(err) = scene.set_layer_visible(layer, false) {
            warn!(layer, error = %err, "忽略无效的隐藏图层配置");
        }
    }

    Ok(LoadedScene {
        scene,
        source,
        row_errors,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;
    use vdraw_io::DocumentSaver;

    use super::*;

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl CapturedLog {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("日志缓冲区被污染")).into_owned()
        }
    }

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("日志缓冲区被污染").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLog {
        type Writer = CapturedLog;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn each_row_error_is_logged_once() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let path = dir.path().join("broken.vd");
        fs::write(&path, "A=rect: x=0\nB=rect: x=0, y=0, w=1, h=1\nC=line: 0, 0\n")
            .expect("写入测试文件失败");

        let log = CapturedLog::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(log.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let loaded = tracing::subscriber::with_default(subscriber, || {
            load_scene(&path, &AppConfig::default())
        })
        .expect("加载应当成功");

        assert_eq!(loaded.row_errors.len(), 2);
        let output = log.contents();
        assert_eq!(output.lines().filter(|line| line.contains("WARN")).count(), 2);
        assert_eq!(output.matches("row=1").count(), 1);
        assert_eq!(output.matches("row=3").count(), 1);
    }

    #[test]
    fn extension_selects_loader() {
        assert!(matches!(
            DocumentSource::from_path(Path::new("plan.JSON")),
            DocumentSource::Json(_)
        ));
        assert!(matches!(
            DocumentSource::from_path(Path::new("plan.vd")),
            DocumentSource::Dsl(_)
        ));
        assert!(matches!(
            DocumentSource::from_path(Path::new("plan")),
            DocumentSource::Dsl(_)
        ));
    }

    #[test]
    fn dsl_load_keeps_row_errors_and_applies_hidden_layers() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let path = dir.path().join("plan.vd");
        fs::write(
            &path,
            "A=rect: x=0, y=0, w=4, h=4, lr=2\nB=rect: x=0, y=0, w=0, h=4\nC=line: 0, 0, 5, 5\n",
        )
        .expect("写入测试文件失败");

        let mut config = AppConfig::default();
        config.layers.hidden = vec![2, 7];
        let loaded = load_scene(&path, &config).expect("加载应当成功");

        assert_eq!(loaded.source, DocumentSource::Dsl(path.clone()));
        assert_eq!(loaded.row_errors.len(), 1);
        assert_eq!(loaded.row_errors[0].row, 2);
        assert!(!loaded.scene.is_layer_visible(2));
        let visible: Vec<_> = loaded.scene.visible_shapes().map(|s| s.id()).collect();
        assert_eq!(visible, vec!["C"]);
    }

    #[test]
    fn json_load_round_trips_saved_document() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let path = dir.path().join("plan.json");
        let document = vdraw_io::parse_drawing("A=rect: x=1, y=1, w=2, h=2").document;
        JsonFacade::new()
            .save(&document, &path)
            .expect("写入 JSON 失败");

        let loaded = load_scene(&path, &AppConfig::default()).expect("加载应当成功");
        assert!(loaded.row_errors.is_empty());
        assert_eq!(loaded.scene.document(), &document);
    }

    #[test]
    fn missing_file_surfaces_io_error() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let err = load_scene(&dir.path().join("absent.vd"), &AppConfig::default()).unwrap_err();
        assert!(matches!(err, FrontendError::Io(_)));
    }
}
