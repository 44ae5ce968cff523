//! Broadcasts published desktop state to every connected reader, one JSON
//! document per line.
use crate::errors::Result;
use crate::models::dto::DesktopState;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Connected readers and the line they were last sent. A reader that
/// connects late gets that line first.
#[derive(Debug, Default)]
struct Broadcast {
    readers: Vec<UnixStream>,
    last_line: String,
}

impl Broadcast {
    async fn send(&mut self, line: String) {
        let mut alive = Vec::with_capacity(self.readers.len());
        for mut reader in self.readers.drain(..) {
            if reader.write_all(line.as_bytes()).await.is_ok() {
                alive.push(reader);
            }
        }
        self.readers = alive;
        self.last_line = line;
    }

    async fn welcome(&mut self, mut reader: UnixStream) {
        if !self.last_line.is_empty() && reader.write_all(self.last_line.as_bytes()).await.is_err() {
            return;
        }
        self.readers.push(reader);
    }
}

#[derive(Debug, Default)]
pub struct StateSocket {
    broadcast: Arc<Mutex<Broadcast>>,
    accept_task: Option<JoinHandle<()>>,
    socket_file: PathBuf,
}

impl Drop for StateSocket {
    fn drop(&mut self) {
        if let Some(task) = self.accept_task.take() {
            task.abort();
            std::fs::remove_file(&self.socket_file).ok();
        }
    }
}

impl StateSocket {
    /// Binds `socket_file`, replacing a stale socket left behind by an
    /// earlier run, and starts accepting readers.
    ///
    /// # Errors
    ///
    /// Fails when the socket cannot be bound, usually a filesystem issue
    /// such as missing permissions.
    pub async fn listen(&mut self, socket_file: PathBuf) -> Result<()> {
        let listener = bind(&socket_file).await?;
        let broadcast = Arc::clone(&self.broadcast);
        self.accept_task = Some(tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((reader, _)) => broadcast.lock().await.welcome(reader).await,
                    Err(err) => tracing::error!("Accepting a state reader failed: {:?}", err),
                }
            }
        }));
        self.socket_file = socket_file;
        Ok(())
    }

    /// Stops accepting readers and removes the socket file.
    pub async fn shutdown(&mut self) {
        if let Some(task) = self.accept_task.take() {
            task.abort();
            task.await.ok();
            fs::remove_file(&self.socket_file).await.ok();
        }
    }

    /// Sends `state` to every reader unless it equals what was sent last.
    /// Readers that went away are forgotten.
    ///
    /// # Errors
    ///
    /// Fails if the state cannot be serialized.
    pub async fn write_desktop_state(&mut self, state: &DesktopState) -> Result<()> {
        if self.accept_task.is_none() {
            return Ok(());
        }
        let mut line = serde_json::to_string(state)?;
        line.push('\n');
        let mut broadcast = self.broadcast.lock().await;
        if line != broadcast.last_line {
            broadcast.send(line).await;
        }
        Ok(())
    }
}

async fn bind(socket_file: &Path) -> Result<UnixListener> {
    match UnixListener::bind(socket_file) {
        Ok(listener) => Ok(listener),
        Err(err) if err.kind() == ErrorKind::AddrInUse => {
            tracing::debug!("Replacing stale socket {}", socket_file.display());
            fs::remove_file(socket_file).await?;
            Ok(UnixListener::bind(socket_file)?)
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClientId;
    use crate::test_utils::temp_path;
    use tokio::io::{AsyncBufReadExt, BufReader};

    fn sample_state() -> DesktopState {
        DesktopState {
            desktop_count: 2,
            desktop_names: vec!["web".to_owned(), "code".to_owned()],
            current_desktop: Some(1),
            stacking_list: vec![ClientId(1), ClientId(4)],
        }
    }

    #[tokio::test]
    async fn multiple_peers() {
        let state = sample_state();
        let socket_file = temp_path().await.unwrap();
        let mut state_socket = StateSocket::default();
        state_socket.listen(socket_file.clone()).await.unwrap();
        state_socket.write_desktop_state(&state).await.unwrap();

        for _ in 0..3 {
            let line = BufReader::new(UnixStream::connect(socket_file.clone()).await.unwrap())
                .lines()
                .next_line()
                .await
                .expect("Read next line")
                .unwrap();
            assert_eq!(serde_json::from_str::<DesktopState>(&line).unwrap(), state);
        }

        state_socket.shutdown().await;
    }

    #[tokio::test]
    async fn get_update() {
        let mut state = sample_state();
        let socket_file = temp_path().await.unwrap();
        let mut state_socket = StateSocket::default();
        state_socket.listen(socket_file.clone()).await.unwrap();
        state_socket.write_desktop_state(&state).await.unwrap();

        let mut lines = BufReader::new(UnixStream::connect(socket_file).await.unwrap()).lines();
        assert_eq!(
            serde_json::to_string(&state).unwrap(),
            lines.next_line().await.expect("Read next line").unwrap()
        );

        state.current_desktop = Some(0);
        state_socket.write_desktop_state(&state).await.unwrap();
        assert_eq!(
            serde_json::to_string(&state).unwrap(),
            lines.next_line().await.expect("Read next line").unwrap()
        );

        state_socket.shutdown().await;
    }

    #[tokio::test]
    async fn early_reader_gets_the_first_state() {
        let state = sample_state();
        let socket_file = temp_path().await.unwrap();
        let mut state_socket = StateSocket::default();
        state_socket.listen(socket_file.clone()).await.unwrap();

        let mut lines = BufReader::new(UnixStream::connect(socket_file).await.unwrap()).lines();
        state_socket.write_desktop_state(&state).await.unwrap();
        let line = lines.next_line().await.expect("Read next line").unwrap();
        assert_eq!(serde_json::from_str::<DesktopState>(&line).unwrap(), state);

        state_socket.shutdown().await;
    }

    #[tokio::test]
    async fn socket_cleanup() {
        let socket_file = temp_path().await.unwrap();
        let mut state_socket = StateSocket::default();
        state_socket.listen(socket_file.clone()).await.unwrap();
        state_socket.shutdown().await;
        assert!(!socket_file.exists());
    }

    #[tokio::test]
    async fn socket_already_bound() {
        let socket_file = temp_path().await.unwrap();
        let mut old_socket = StateSocket::default();
        old_socket.listen(socket_file.clone()).await.unwrap();
        assert!(socket_file.exists());
        let mut state_socket = StateSocket::default();
        state_socket.listen(socket_file.clone()).await.unwrap();
        state_socket.shutdown().await;
        assert!(!socket_file.exists());
        old_socket.shutdown().await;
    }
}
