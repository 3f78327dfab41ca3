use crate::dom::js_err;
use crystal_core::{DecodedAudio, ANALYSER_FFT_SIZE};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// WebAudio graph for decoded-file playback:
/// buffer source -> gain (mute) -> analyser -> destination.
pub struct AudioOutput {
    ctx: web::AudioContext,
    gain: web::GainNode,
    analyser: web::AnalyserNode,
    buffer: Option<web::AudioBuffer>,
    source: Option<web::AudioBufferSourceNode>,
    muted: bool,
}

impl AudioOutput {
    pub fn new() -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new().map_err(js_err)?;
        let gain = ctx.create_gain().map_err(js_err)?;
        let analyser = ctx.create_analyser().map_err(js_err)?;
        analyser.set_fft_size(ANALYSER_FFT_SIZE);
        gain.connect_with_audio_node(&analyser).map_err(js_err)?;
        analyser
            .connect_with_audio_node(&ctx.destination())
            .map_err(js_err)?;
        log::info!("[audio] graph ready, fft size {}", analyser.fft_size());
        Ok(Self {
            ctx,
            gain,
            analyser,
            buffer: None,
            source: None,
            muted: false,
        })
    }

    pub fn context(&self) -> web::AudioContext {
        self.ctx.clone()
    }

    /// Audio clock in seconds.
    #[inline]
    pub fn now(&self) -> f64 {
        self.ctx.current_time()
    }

    pub fn set_buffer(&mut self, buffer: Option<web::AudioBuffer>) {
        self.halt();
        self.buffer = buffer;
    }

    /// Start the buffer at `offset` seconds. Browsers suspend contexts created
    /// before a user gesture, so this also resumes the context.
    pub fn start(&mut self, offset: f64) -> anyhow::Result<()> {
        self.halt();
        let Some(buffer) = &self.buffer else {
            return Ok(());
        };
        if self.ctx.state() == web::AudioContextState::Suspended {
            let _ = self.ctx.resume();
        }
        let source = self.ctx.create_buffer_source().map_err(js_err)?;
        source.set_buffer(Some(buffer));
        source.connect_with_audio_node(&self.gain).map_err(js_err)?;
        source
            .start_with_when_and_grain_offset(0.0, offset)
            .map_err(js_err)?;
        self.source = Some(source);
        Ok(())
    }

    /// Stop and drop the running source, if any.
    pub fn halt(&mut self) {
        if let Some(source) = self.source.take() {
            #[allow(deprecated)]
            let _ = source.stop();
            let _ = source.disconnect();
        }
    }

    /// Copy the latest time-domain snapshot into `buf`.
    pub fn sample_window(&self, buf: &mut Vec<u8>) {
        let n = self.analyser.fft_size() as usize;
        if buf.len() != n {
            buf.resize(n, 128);
        }
        self.analyser.get_byte_time_domain_data(buf);
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.gain
            .gain()
            .set_value(if self.muted { 0.0 } else { 1.0 });
        self.muted
    }
}

/// Decode compressed audio bytes with the browser's decoder.
pub async fn decode(
    ctx: &web::AudioContext,
    bytes: &[u8],
) -> anyhow::Result<(web::AudioBuffer, DecodedAudio)> {
    // Copy out of wasm memory; decodeAudioData detaches the buffer it is given.
    let array = js_sys::Uint8Array::new_with_length(bytes.len() as u32);
    array.copy_from(bytes);
    let promise = ctx.decode_audio_data(&array.buffer()).map_err(js_err)?;
    let buffer: web::AudioBuffer = JsFuture::from(promise)
        .await
        .map_err(js_err)?
        .dyn_into()
        .map_err(js_err)?;
    let channels = (0..buffer.number_of_channels())
        .map(|c| buffer.get_channel_data(c).map_err(js_err))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let decoded = DecodedAudio {
        sample_rate: buffer.sample_rate(),
        channels,
        duration_sec: buffer.duration(),
    };
    log::info!(
        "[audio] decoded {:.1}s, {} channel(s) at {} Hz",
        decoded.duration_sec,
        decoded.channels.len(),
        decoded.sample_rate
    );
    Ok((buffer, decoded))
}
