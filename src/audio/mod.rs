pub mod tone;

use tone::AlarmTone;

use rodio::{OutputStream, Sink};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;

enum ChimeCommand {
    Play,
    Stop,
}

/// Handle to the audio thread that plays the alarm chime.
///
/// rodio's output stream is not `Send`, so the stream and sink live on a dedicated thread that
/// is started lazily on the first `play`.
#[derive(Clone)]
pub struct ChimeEngineHandle {
    tx: Arc<Mutex<Option<Sender<ChimeCommand>>>>,
    is_playing: Arc<AtomicBool>,
}

impl ChimeEngineHandle {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
            is_playing: Arc::new(AtomicBool::new(false)),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<ChimeCommand>, String> {
        if let Some(tx) = self.tx.lock().map_err(|e| e.to_string())?.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<ChimeCommand>();
        let is_playing = Arc::clone(&self.is_playing);

        thread::Builder::new()
            .name("alarm-chime".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        ChimeCommand::Play => {
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            match OutputStream::try_default() {
                                Ok((stream, handle)) => match Sink::try_new(&handle) {
                                    Ok(new_sink) => {
                                        new_sink.append(AlarmTone::new());
                                        new_sink.play();
                                        _stream = Some(stream);
                                        sink = Some(new_sink);
                                        is_playing.store(true, Ordering::SeqCst);
                                    }
                                    Err(e) => log::warn!("Failed to create chime sink: {}", e),
                                },
                                Err(e) => log::warn!("Failed to open audio output: {}", e),
                            }
                        }
                        ChimeCommand::Stop => {
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            _stream = None;
                            is_playing.store(false, Ordering::SeqCst);
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        let tx_clone = tx.clone();
        *self.tx.lock().map_err(|e| e.to_string())? = Some(tx);
        Ok(tx_clone)
    }

    pub fn play(&self) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        tx.send(ChimeCommand::Play).map_err(|e| e.to_string())
    }

    pub fn stop(&self) -> Result<(), String> {
        if let Ok(Some(tx)) = self.tx.lock().map(|g| g.clone()) {
            let _ = tx.send(ChimeCommand::Stop);
        }
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing.load(Ordering::SeqCst)
    }
}

impl Default for ChimeEngineHandle {
    fn default() -> Self {
        Self::new()
    }
}
