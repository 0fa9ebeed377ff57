// Session behaviour across preview, config changes and export

use image::{Rgb, RgbImage};
use std::path::PathBuf;
use sukashi::session::thumbnail::THUMBNAIL_MAX_DIM;
use sukashi::session::{export_all, ExportOptions, Session, SessionEvent};
use sukashi::watermark::{decode_image, Placement};
use tempfile::TempDir;

fn write_images(dir: &TempDir, sizes: &[(u32, u32)]) -> Vec<PathBuf> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| {
            let path = dir.path().join(format!("img{}.png", i));
            RgbImage::from_pixel(w, h, Rgb([50, 60, 70])).save(&path).unwrap();
            path
        })
        .collect()
}

#[test]
fn test_thumbnails_fit_preview_box() {
    let dir = TempDir::new().unwrap();
    let paths = write_images(&dir, &[(1600, 900), (500, 1000), (120, 80)]);

    let mut session = Session::default();
    session.add_images(&paths);

    let expected = [(200, 113), (100, 200), (120, 80)];
    for (item, (w, h)) in session.images().iter().zip(expected) {
        assert_eq!((item.thumbnail.width, item.thumbnail.height), (w, h));
        assert!(item.thumbnail.width.max(item.thumbnail.height) <= THUMBNAIL_MAX_DIM);
        let decoded = decode_image(&item.thumbnail.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (w, h));
    }
}

#[test]
fn test_preview_follows_selection_and_config() {
    let dir = TempDir::new().unwrap();
    let paths = write_images(&dir, &[(300, 200), (150, 400)]);

    let mut session = Session::default();
    let events = session.subscribe();
    session.add_images(&paths);

    assert_eq!(session.render_preview().unwrap().unwrap().dimensions(), (300, 200));

    session.set_active(1);
    session.update_config(|config| {
        config.placement = Placement::Single;
        config.crop_ratio = "1:1".parse().unwrap();
    });
    assert_eq!(session.render_preview().unwrap().unwrap().dimensions(), (150, 150));

    let received: Vec<SessionEvent> = events.try_iter().collect();
    assert_eq!(
        received,
        vec![
            SessionEvent::ImagesChanged {
                count: 2,
                active: Some(0)
            },
            SessionEvent::ImagesChanged {
                count: 2,
                active: Some(1)
            },
            SessionEvent::ConfigChanged,
        ]
    );
}

#[test]
fn test_export_marks_items_processed() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let paths = write_images(&dir, &[(40, 40), (50, 30)]);

    let mut session = Session::default();
    session.add_images(&paths);
    assert!(session.images().iter().all(|item| !item.processed));

    let options = ExportOptions {
        output_dir: out.path().to_path_buf(),
        ..Default::default()
    };
    export_all(&mut session, &options).unwrap();
    assert!(session.images().iter().all(|item| item.processed));

    session.clear();
    assert!(session.is_empty());
    assert!(session.render_preview().unwrap().is_none());
}
