use super::GalleryApp;
use notify::event::ModifyKind;
use notify::{EventKind, RecursiveMode, Watcher};
use rgallery::image_loader::is_supported_image;
use rgallery::ImageAttrs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use walkdir::WalkDir;

/// Supported images directly inside `folder`, in natural name order.
pub fn scan_folder(folder: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_supported_image(p))
        .collect();
    sort_natural(&mut paths);
    paths
}

pub fn sort_natural(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| {
        let a_name = a
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let b_name = b
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        natord::compare(&a_name, &b_name)
    });
}

impl GalleryApp {
    pub fn load_folder(&mut self, folder: PathBuf) {
        for (_, node) in self.entries.drain(..) {
            self.document.remove(node);
        }
        self.textures.clear();

        for path in scan_folder(&folder) {
            self.add_path(path);
        }
        if let Err(e) = self.watch_folder(&folder) {
            log::warn!("Not watching {}: {} [{}]", folder.display(), e, e.error_code());
        }
        self.current_folder = Some(folder);
        self.set_status_message(format!("Loaded {} images", self.entries.len()));
    }

    /// Put an image element for `path` on the page.
    fn add_path(&mut self, path: PathBuf) {
        if self.entries.iter().any(|(p, _)| *p == path) {
            return;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let attrs = ImageAttrs::new(path.to_string_lossy()).with_alt(stem).with_title(name);
        let node = self.document.create_image(attrs);
        self.document.append(self.gallery_root, node);
        self.entries.push((path, node));
    }

    fn remove_path(&mut self, path: &Path) {
        let Some(pos) = self.entries.iter().position(|(p, _)| p == path) else {
            return;
        };
        let (path, node) = self.entries.remove(pos);
        self.document.remove(node);
        self.textures.forget(&path.to_string_lossy());
    }

    pub fn watch_folder(&mut self, folder: &Path) -> rgallery::Result<()> {
        self.fs_watcher = None;
        self.fs_rx = None;

        let (tx, rx) = channel();
        let ctx = self.ctx.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = tx.send(res);
            ctx.request_repaint();
        })?;
        watcher.watch(folder, RecursiveMode::NonRecursive)?;

        self.fs_watcher = Some(watcher);
        self.fs_rx = Some(rx);
        Ok(())
    }

    pub fn process_fs_events(&mut self) {
        let Some(rx) = self.fs_rx.as_ref() else {
            return;
        };
        let events: Vec<_> = rx.try_iter().collect();
        for res in events {
            match res {
                Ok(event) => self.apply_fs_event(event),
                Err(e) => log::warn!("Folder watch error: {e}"),
            }
        }
    }

    fn apply_fs_event(&mut self, event: notify::Event) {
        if !matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_))
        ) {
            return;
        }
        for path in event.paths {
            if !is_supported_image(&path) {
                continue;
            }
            if path.is_file() {
                self.add_path(path);
            } else {
                self.remove_path(&path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_natural_order() {
        let mut paths: Vec<PathBuf> = ["img10.png", "IMG2.png", "img1.png"].iter().map(PathBuf::from).collect();
        sort_natural(&mut paths);
        assert_eq!(
            paths,
            vec![PathBuf::from("img1.png"), PathBuf::from("IMG2.png"), PathBuf::from("img10.png")]
        );
    }

    #[test]
    fn test_scan_skips_other_files_and_subfolders() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"").unwrap();
        std::fs::write(dir.path().join("a.png"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.jpg"), b"").unwrap();

        let names: Vec<_> = scan_folder(dir.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.png", "b.jpg"]);
    }
}
