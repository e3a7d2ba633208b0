//! Renderer running in its own thread.
//!
//! Frames are requested over a channel, each request is answered with the
//! path of the written PNG or an error message.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    thread::JoinHandle,
};

use crossbeam_channel::{Receiver, Sender};
use volume_tf::{
    pipeline::SharedTransfer,
    render::{OrbitCamera, RayCastRenderer, RenderBackend, RenderParams},
    volumetric::VolumeGrid,
};

pub enum RenderThreadMessage {
    Render {
        camera: OrbitCamera,
        params: RenderParams,
        path: PathBuf,
    },
    /// Thread will get ready to be joined
    ShutDown,
}

pub type RenderReply = Result<PathBuf, String>;

pub struct RenderThread {
    renderer: RayCastRenderer,
    transfer: SharedTransfer,
    /// Generation of the uploaded transfer volume
    uploaded: Option<u64>,
    buffer: Vec<u8>,
    communication_in: (Sender<RenderThreadMessage>, Receiver<RenderThreadMessage>),
    communication_out: (Sender<RenderReply>, Receiver<RenderReply>),
}

impl RenderThread {
    pub fn new(volume: Arc<VolumeGrid>, transfer: SharedTransfer) -> Self {
        let mut renderer = RayCastRenderer::default();
        renderer.upload_volume(volume);
        Self {
            renderer,
            transfer,
            uploaded: None,
            buffer: vec![],
            communication_in: crossbeam_channel::unbounded(), // main -> renderer
            communication_out: crossbeam_channel::unbounded(), // renderer -> main
        }
    }

    pub fn get_sender(&self) -> Sender<RenderThreadMessage> {
        self.communication_in.0.clone()
    }

    pub fn get_receiver(&self) -> Receiver<RenderReply> {
        self.communication_out.1.clone()
    }

    /// Upload the published transfer volume if it changed since last frame.
    /// Returns whether an upload happened.
    fn sync_transfer(&mut self) -> bool {
        let (generation, volume) = self.transfer.snapshot();
        if self.uploaded == Some(generation) {
            return false;
        }
        log::debug!("Uploading transfer volume, generation {generation}");
        self.renderer.upload_transfer(volume);
        self.uploaded = Some(generation);
        true
    }

    fn render_to_file(
        &mut self,
        camera: &OrbitCamera,
        params: &RenderParams,
        path: &Path,
    ) -> RenderReply {
        self.sync_transfer();

        let (w, h) = params.resolution;
        self.buffer.resize(3 * w * h, 0);
        self.renderer.render(camera, params, &mut self.buffer);

        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|e| format!("{}: {e}", dir.display()))?;
            }
        }
        image::save_buffer(
            path,
            &self.buffer,
            w as u32,
            h as u32,
            image::ColorType::Rgb8,
        )
        .map_err(|e| format!("{}: {e}", path.display()))?;
        Ok(path.to_path_buf())
    }

    /// Spawn the thread, it waits for messages
    pub fn start(mut self) -> JoinHandle<()> {
        std::thread::spawn(move || loop {
            let msg = match self.communication_in.1.recv() {
                Ok(msg) => msg,
                Err(_) => return, // all senders gone
            };

            match msg {
                RenderThreadMessage::Render {
                    camera,
                    params,
                    path,
                } => {
                    let reply = self.render_to_file(&camera, &params, &path);
                    if self.communication_out.0.send(reply).is_err() {
                        return;
                    }
                }
                RenderThreadMessage::ShutDown => return,
            }
        })
    }
}

#[cfg(test)]
mod test {

    use volume_tf::{
        pipeline::Command,
        test_helpers::{ball_grid, scratch_dir},
        PipelineContext, PipelineOptions,
    };

    use super::*;

    #[test]
    fn transfer_uploaded_on_change() {
        let mut context =
            PipelineContext::from_grid(ball_grid(8, 3.0, 200), PipelineOptions::default())
                .unwrap();
        let mut thread = RenderThread::new(context.grid().clone(), context.transfer());

        assert!(thread.sync_transfer());
        assert!(!thread.sync_transfer());

        assert!(context.apply(Command::HueHighDown).unwrap());
        assert!(thread.sync_transfer());
        assert!(!thread.sync_transfer());
    }

    #[test]
    fn renders_png() {
        let context =
            PipelineContext::from_grid(ball_grid(8, 3.0, 200), PipelineOptions::default())
                .unwrap();
        let thread = RenderThread::new(context.grid().clone(), context.transfer());
        let sender = thread.get_sender();
        let replies = thread.get_receiver();
        let handle = thread.start();

        let path = scratch_dir("vol_app-render").join("frames/one.png");
        let params = context.controls().render_params((24, 16));
        sender
            .send(RenderThreadMessage::Render {
                camera: OrbitCamera::unit_cube(),
                params,
                path: path.clone(),
            })
            .unwrap();

        assert_eq!(replies.recv().unwrap(), Ok(path.clone()));
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (24, 16));

        sender.send(RenderThreadMessage::ShutDown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn unwritable_path_reported() {
        let context =
            PipelineContext::from_grid(ball_grid(4, 1.0, 10), PipelineOptions::default()).unwrap();
        let mut thread = RenderThread::new(context.grid().clone(), context.transfer());
        let dir = scratch_dir("vol_app-bad");
        // extension without an encoder
        let res = thread.render_to_file(
            &OrbitCamera::unit_cube(),
            &context.controls().render_params((4, 4)),
            &dir.join("frame.unknownext"),
        );
        assert!(res.is_err());
    }
}
