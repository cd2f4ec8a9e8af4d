use crate::*;
use log::{info, warn};

/// Controller of the full-screen benchmark: owns the session and waits for completion.
pub struct BenchmarkScreen {
    request: BenchmarkRequest,
    receiver: CompletionReceiver,
    session: Session,
}

impl BenchmarkScreen {
    /// Validates the launch extras and starts a session.
    ///
    /// The returned sender goes to the [BenchmarkView] driving the render loop.
    pub fn launch(extras: &ValueMap) -> Result<(BenchmarkScreen, CompletionSender), BenchmarkError> {
        let request = BenchmarkRequest::from_extras(extras)?;
        let mut session = Session::new();
        session.configure()?;
        session.launch(request)?;

        let (sender, receiver) = completion_channel();
        info!(
            "benchmark launched: {}, {} objects",
            request.api_level, request.object_count
        );
        Ok((
            BenchmarkScreen {
                request,
                receiver,
                session,
            },
            sender,
        ))
    }

    pub fn request(&self) -> &BenchmarkRequest {
        &self.request
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Returns the result extras exactly once, when the run has completed.
    pub fn poll(&mut self) -> Option<ValueMap> {
        if !matches!(self.session.state(), SessionState::Running(_)) {
            return None;
        }
        match self.receiver.poll() {
            Completion::Pending => None,
            Completion::Finished(fps) => {
                self.session.complete(fps).ok()?;
                let result = self.session.report().ok()?;
                info!(
                    "benchmark finished: {}, {} objects, {:.1} fps",
                    result.api_level, result.object_count, result.fps
                );
                Some(result.to_extras())
            }
            Completion::Cancelled => {
                warn!("renderer went away before completing");
                let _ = self.session.cancel();
                None
            }
        }
    }

    /// Tears the screen down, discarding a run still in flight.
    pub fn destroy(&mut self) {
        if matches!(self.session.state(), SessionState::Running(_)) {
            info!("benchmark cancelled");
            let _ = self.session.cancel();
        }
    }
}
