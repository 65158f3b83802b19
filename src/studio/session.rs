use crate::foundation::core::{Canvas, Fps, LayerId};
use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::raster::flood_fill::flood_fill;
use crate::raster::pixel_buffer::PixelBuffer;
use crate::render::compositor::{CompositeOpts, LayerCompositor, blend_buffer};
use crate::render::onion::{OnionSkinOpts, render_onion_skin};
use crate::scene::model::{AnimationSequence, Frame, Layer, MAX_LAYERS_PER_FRAME, ToolKind};
use crate::stroke::outline::OutlineOpts;
use crate::studio::commands::Command;
use crate::studio::history::History;
use crate::timeline::clock::PlaybackClock;
use crate::timeline::sequencer::FrameSequencer;

/// Settings for a [`Studio`] session.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StudioOpts {
    /// Undo snapshots kept; older ones are dropped.
    pub history_limit: usize,
    /// Canvas for new documents.
    pub canvas: Canvas,
    /// Frame rate for new documents.
    pub fps: Fps,
    /// Stroke width law for rendering, fill sampling and hit testing.
    pub outline: OutlineOpts,
}

impl Default for StudioOpts {
    fn default() -> Self {
        Self {
            history_limit: 50,
            canvas: Canvas::default(),
            fps: Fps::default(),
            outline: OutlineOpts::default(),
        }
    }
}

enum Applied {
    Unchanged,
    Changed,
    /// Changed, and the selection should move to this frame (and layer, if given).
    Focus { frame: usize, layer: Option<LayerId> },
}

/// Owned editing session: the document plus playback, selection and undo state.
///
/// Every document mutation goes through [`Studio::apply`]. A rejected command leaves the
/// document and the history exactly as they were.
pub struct Studio {
    sequence: AnimationSequence,
    sequencer: FrameSequencer,
    clock: PlaybackClock,
    history: History,
    compositor: LayerCompositor,
    active_frame: usize,
    active_layer: LayerId,
}

impl Studio {
    /// Fresh document with one blank frame.
    pub fn new(opts: StudioOpts) -> FlipbookResult<Self> {
        Self::open(AnimationSequence::new(opts.canvas, opts.fps), opts)
    }

    /// Start a session on an existing document.
    pub fn open(sequence: AnimationSequence, opts: StudioOpts) -> FlipbookResult<Self> {
        sequence.validate()?;
        let sequencer = FrameSequencer::for_sequence(&sequence)?;
        let active_frame = sequencer.active_index();
        let active_layer = top_layer(&sequence.frames[active_frame]);
        Ok(Self {
            clock: PlaybackClock::new(sequence.fps),
            history: History::new(opts.history_limit),
            compositor: LayerCompositor::new(CompositeOpts {
                background: None,
                outline: opts.outline,
            }),
            sequence,
            sequencer,
            active_frame,
            active_layer,
        })
    }

    /// The open document.
    pub fn sequence(&self) -> &AnimationSequence {
        &self.sequence
    }

    /// Close the session and keep the document.
    pub fn into_sequence(self) -> AnimationSequence {
        self.sequence
    }

    /// Playback position.
    pub fn sequencer(&self) -> &FrameSequencer {
        &self.sequencer
    }

    /// Frame being edited.
    pub fn active_frame(&self) -> usize {
        self.active_frame
    }

    /// Layer being edited in the active frame.
    pub fn active_layer(&self) -> LayerId {
        self.active_layer
    }

    /// Whether [`Studio::undo`] would do anything.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether [`Studio::redo`] would do anything.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Apply one edit. On success the pre-edit document becomes an undo step (no-op edits such
    /// as filling with the color already there record nothing).
    #[tracing::instrument(skip(self, command), fields(op = command.name()))]
    pub fn apply(&mut self, command: Command) -> FlipbookResult<()> {
        let before = self.sequence.clone();
        let applied = match self.execute(command) {
            Ok(a) => a,
            Err(e) => {
                self.sequence = before;
                tracing::warn!(error = %e, "command rejected");
                return Err(e);
            }
        };

        match applied {
            Applied::Unchanged => {}
            Applied::Changed => {
                self.history.record(before);
                self.sync();
            }
            Applied::Focus { frame, layer } => {
                self.history.record(before);
                self.sync();
                self.focus(frame, layer);
            }
        }
        Ok(())
    }

    /// Step back one edit. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let done = self.history.undo(&mut self.sequence);
        if done {
            self.sync();
        }
        done
    }

    /// Re-apply the last undone edit. Returns `false` when there is none.
    pub fn redo(&mut self) -> bool {
        let done = self.history.redo(&mut self.sequence);
        if done {
            self.sync();
        }
        done
    }

    /// Advance playback by `elapsed_ms` of wall time. Returns the frame now showing.
    pub fn play(&mut self, elapsed_ms: f64) -> usize {
        let ticks = self.clock.elapse(elapsed_ms);
        if ticks > 0 {
            self.sequencer.advance(ticks);
            let frame = self.sequencer.active_index();
            self.focus(frame, None);
        }
        self.active_frame
    }

    /// Scrub to the start of frame `index` and make it the editing target.
    pub fn select_frame(&mut self, index: usize) -> FlipbookResult<()> {
        self.sequencer.select_frame(index)?;
        self.focus(index, None);
        Ok(())
    }

    /// Make `layer` of the active frame the editing target.
    pub fn select_layer(&mut self, layer: LayerId) -> FlipbookResult<()> {
        if self.sequence.frames[self.active_frame].layer(layer).is_none() {
            return Err(FlipbookError::validation(format!(
                "layer {} not in frame {}",
                layer.0, self.active_frame
            )));
        }
        self.active_layer = layer;
        Ok(())
    }

    /// Flatten frame `index` at canvas size.
    pub fn render_frame(&mut self, index: usize) -> FlipbookResult<PixelBuffer> {
        let frame = frame_at(&self.sequence, index)?;
        self.compositor.composite(&frame.layers, self.sequence.canvas)
    }

    /// The active frame with its neighbours ghosted beneath it.
    pub fn render_onion_skin(&self, opts: &OnionSkinOpts) -> FlipbookResult<PixelBuffer> {
        render_onion_skin(&self.sequence, self.active_frame, opts)
    }

    fn focus(&mut self, frame: usize, layer: Option<LayerId>) {
        let frame = frame.min(self.sequence.frames.len() - 1);
        if self.sequencer.active_index() != frame {
            // Valid by construction after `sync`.
            let _ = self.sequencer.select_frame(frame);
        }
        self.active_frame = frame;
        let f = &self.sequence.frames[frame];
        self.active_layer = match layer {
            Some(id) if f.layer(id).is_some() => id,
            _ if f.layer(self.active_layer).is_some() => self.active_layer,
            _ => top_layer(f),
        };
        self.sequence.playhead_tick = self.sequencer.playhead_tick();
    }

    /// Bring playback and selection back in line with the document after it changed.
    fn sync(&mut self) {
        if let Err(e) = self.sequencer.set_durations(&self.sequence.frame_durations()) {
            tracing::warn!(error = %e, "document has no playable frames");
            return;
        }
        self.clock.set_fps(self.sequence.fps);
        self.focus(self.active_frame, None);
    }

    fn execute(&mut self, command: Command) -> FlipbookResult<Applied> {
        let canvas = self.sequence.canvas;
        match command {
            Command::AddFrame { after } => {
                let index = match after {
                    Some(a) => {
                        frame_at(&self.sequence, a)?;
                        a + 1
                    }
                    None => self.sequence.frames.len(),
                };
                let frame = Frame::new(self.sequence.next_frame_id(), self.sequence.next_layer_id());
                self.sequence.frames.insert(index, frame);
                Ok(Applied::Focus { frame: index, layer: None })
            }
            Command::DuplicateFrame { index } => {
                let mut copy = frame_at(&self.sequence, index)?.clone();
                copy.id = self.sequence.next_frame_id();
                let mut next = self.sequence.next_layer_id().0;
                for layer in &mut copy.layers {
                    layer.id = LayerId(next);
                    next += 1;
                }
                self.sequence.frames.insert(index + 1, copy);
                Ok(Applied::Focus { frame: index + 1, layer: None })
            }
            Command::DeleteFrame { index } => {
                frame_at(&self.sequence, index)?;
                if self.sequence.frames.len() == 1 {
                    return Err(FlipbookError::validation("cannot delete the last frame"));
                }
                self.sequence.frames.remove(index);
                Ok(Applied::Focus {
                    frame: index.saturating_sub(1),
                    layer: None,
                })
            }
            Command::SetFrameDuration { index, ticks } => {
                if ticks == 0 {
                    return Err(FlipbookError::validation("frame duration must be >= 1 tick"));
                }
                frame_at_mut(&mut self.sequence, index)?.duration_ticks = ticks;
                Ok(Applied::Changed)
            }
            Command::AddLayer { frame, name } => {
                let id = self.sequence.next_layer_id();
                let f = frame_at_mut(&mut self.sequence, frame)?;
                if f.layers.len() >= MAX_LAYERS_PER_FRAME {
                    return Err(FlipbookError::validation(format!(
                        "frame already has {MAX_LAYERS_PER_FRAME} layers"
                    )));
                }
                let name = name.unwrap_or_else(|| format!("Layer {}", f.layers.len() + 1));
                f.layers.push(Layer::new(id, name));
                Ok(Applied::Focus {
                    frame,
                    layer: Some(id),
                })
            }
            Command::DeleteLayer { frame, layer } => {
                let f = frame_at_mut(&mut self.sequence, frame)?;
                let i = layer_index(f, layer)?;
                if f.layers.len() == 1 {
                    return Err(FlipbookError::validation("cannot delete the last layer"));
                }
                f.layers.remove(i);
                Ok(Applied::Changed)
            }
            Command::MoveLayer { frame, layer, to } => {
                let f = frame_at_mut(&mut self.sequence, frame)?;
                let i = layer_index(f, layer)?;
                if to >= f.layers.len() {
                    return Err(FlipbookError::validation(format!(
                        "layer position {to} out of range (layers: {})",
                        f.layers.len()
                    )));
                }
                if i == to {
                    return Ok(Applied::Unchanged);
                }
                let moved = f.layers.remove(i);
                f.layers.insert(to, moved);
                Ok(Applied::Changed)
            }
            Command::MergeLayerDown { frame, layer } => {
                let f = frame_at_mut(&mut self.sequence, frame)?;
                let i = layer_index(f, layer)?;
                if i == 0 {
                    return Err(FlipbookError::validation(
                        "bottom layer has nothing to merge into",
                    ));
                }
                let upper = f.layers.remove(i);
                let lower = &mut f.layers[i - 1];
                let mut merged = self.compositor.rasterize(lower, canvas)?;
                if upper.visible && upper.opacity > 0.0 {
                    let top = self.compositor.rasterize(&upper, canvas)?;
                    blend_buffer(&mut merged, &top, upper.blend_mode, upper.opacity);
                }
                lower.raster = Some(merged);
                lower.strokes.clear();
                lower.shapes.clear();
                let id = lower.id;
                Ok(Applied::Focus {
                    frame,
                    layer: Some(id),
                })
            }
            Command::SetLayerVisible {
                frame,
                layer,
                visible,
            } => {
                layer_mut(&mut self.sequence, frame, layer)?.visible = visible;
                Ok(Applied::Changed)
            }
            Command::SetLayerOpacity {
                frame,
                layer,
                opacity,
            } => {
                if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
                    return Err(FlipbookError::validation("layer opacity must be in [0, 1]"));
                }
                layer_mut(&mut self.sequence, frame, layer)?.opacity = opacity;
                Ok(Applied::Changed)
            }
            Command::SetBlendMode { frame, layer, mode } => {
                layer_mut(&mut self.sequence, frame, layer)?.blend_mode = mode;
                Ok(Applied::Changed)
            }
            Command::RenameLayer { frame, layer, name } => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(FlipbookError::validation("layer name must be non-empty"));
                }
                layer_mut(&mut self.sequence, frame, layer)?.name = name.to_owned();
                Ok(Applied::Changed)
            }
            Command::CommitStroke {
                frame,
                layer,
                stroke,
            } => {
                stroke.validate()?;
                layer_mut(&mut self.sequence, frame, layer)?
                    .strokes
                    .push(stroke);
                Ok(Applied::Changed)
            }
            Command::AddShape {
                frame,
                layer,
                shape,
            } => {
                shape.validate()?;
                layer_mut(&mut self.sequence, frame, layer)?
                    .shapes
                    .push(shape);
                Ok(Applied::Changed)
            }
            Command::Fill {
                frame,
                layer,
                x,
                y,
                color,
            } => {
                let target = layer_mut(&mut self.sequence, frame, layer)?;
                // Sample what the layer looks like, but only bake the region into its raster.
                let mut drawn = self.compositor.rasterize(target, canvas)?;
                let outcome = flood_fill(&mut drawn, x, y, color)?;
                if outcome.is_noop() {
                    return Ok(Applied::Unchanged);
                }
                // Erasers paint over the raster, so they would cut the new fill again.
                if let Some(last) = target.strokes.iter().rposition(|s| s.tool == ToolKind::Eraser) {
                    let mut head = Layer::new(target.id, target.name.clone());
                    head.raster = target.raster.take();
                    head.strokes = target.strokes.drain(..=last).collect();
                    target.raster = Some(self.compositor.rasterize(&head, canvas)?);
                }
                let raster = match target.raster.take() {
                    Some(r) if r.width() == canvas.width && r.height() == canvas.height => r,
                    Some(r) => {
                        let mut fitted = PixelBuffer::new(canvas.width, canvas.height);
                        fitted.blit(&r, 0, 0);
                        fitted
                    }
                    None => PixelBuffer::new(canvas.width, canvas.height),
                };
                let raster = target.raster.insert(raster);
                outcome.mask.apply(raster, color)?;
                Ok(Applied::Changed)
            }
            Command::ClearLayer { frame, layer } => {
                let l = layer_mut(&mut self.sequence, frame, layer)?;
                if l.is_blank() {
                    return Ok(Applied::Unchanged);
                }
                l.raster = None;
                l.strokes.clear();
                l.shapes.clear();
                Ok(Applied::Changed)
            }
            Command::SetFps { fps } => {
                if fps == self.sequence.fps {
                    return Ok(Applied::Unchanged);
                }
                self.sequence.fps = fps;
                Ok(Applied::Changed)
            }
        }
    }
}

fn top_layer(frame: &Frame) -> LayerId {
    frame.layers.last().map(|l| l.id).unwrap_or(LayerId(0))
}

fn frame_at(seq: &AnimationSequence, index: usize) -> FlipbookResult<&Frame> {
    seq.frames.get(index).ok_or_else(|| {
        FlipbookError::validation(format!(
            "frame index {index} out of range (frames: {})",
            seq.frames.len()
        ))
    })
}

fn frame_at_mut(seq: &mut AnimationSequence, index: usize) -> FlipbookResult<&mut Frame> {
    let len = seq.frames.len();
    seq.frames.get_mut(index).ok_or_else(|| {
        FlipbookError::validation(format!("frame index {index} out of range (frames: {len})"))
    })
}

fn layer_index(frame: &Frame, layer: LayerId) -> FlipbookResult<usize> {
    frame.layer_index(layer).ok_or_else(|| {
        FlipbookError::validation(format!("layer {} not in frame {}", layer.0, frame.id.0))
    })
}

fn layer_mut(seq: &mut AnimationSequence, frame: usize, layer: LayerId) -> FlipbookResult<&mut Layer> {
    let f = frame_at_mut(seq, frame)?;
    let i = layer_index(f, layer)?;
    Ok(&mut f.layers[i])
}

#[cfg(test)]
#[path = "../../tests/unit/studio/session.rs"]
mod tests;
