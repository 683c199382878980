//! Beam and alarm overlay presentation
//!
//! Applies [`RenderParams`] verbatim: the beam runs from the detector's local
//! origin to the endpoint, the overlay is a fixed-size square centered on the
//! detector. Geometry is in the detector's local frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use wgpu::util::DeviceExt;

use super::shapes::{line_segment, rect};
use super::vertex::Vertex;
use crate::consts::{BEAM_WIDTH, OVERLAY_SIZE};
use crate::sim::RenderParams;

/// Anything that draws a detector frame
pub trait Presenter {
    fn present(&mut self, params: &RenderParams);
}

/// Fixed presentation sizes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamStyle {
    pub beam_width: f32,
    pub overlay_size: f32,
}

impl Default for BeamStyle {
    fn default() -> Self {
        Self {
            beam_width: BEAM_WIDTH,
            overlay_size: OVERLAY_SIZE,
        }
    }
}

/// Presenter that tessellates each frame into vertex buffers
#[derive(Debug, Clone, Default)]
pub struct MeshPresenter {
    pub style: BeamStyle,
    beam: Vec<Vertex>,
    overlay: Vec<Vertex>,
    frames: u64,
}

impl MeshPresenter {
    pub fn new(style: BeamStyle) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    /// Beam triangles from the last presented frame
    pub fn beam(&self) -> &[Vertex] {
        &self.beam
    }

    /// Overlay triangles from the last presented frame
    pub fn overlay(&self) -> &[Vertex] {
        &self.overlay
    }

    /// Overlay first, beam on top, ready for upload
    pub fn vertex_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(
            (self.overlay.len() + self.beam.len()) * std::mem::size_of::<Vertex>(),
        );
        bytes.extend_from_slice(bytemuck::cast_slice(&self.overlay));
        bytes.extend_from_slice(bytemuck::cast_slice(&self.beam));
        bytes
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    /// Vertex layout matching [`MeshPresenter::vertex_bytes`]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        Vertex::desc()
    }

    /// Upload the last presented frame into a fresh vertex buffer
    pub fn upload(&self, device: &wgpu::Device) -> wgpu::Buffer {
        let bytes = self.vertex_bytes();
        device.create_buffer_init(&vertex_buffer_desc(&bytes))
    }
}

/// Init descriptor for a detector vertex buffer
pub fn vertex_buffer_desc(contents: &[u8]) -> wgpu::util::BufferInitDescriptor<'_> {
    wgpu::util::BufferInitDescriptor {
        label: Some("Tripwire Vertex Buffer"),
        contents,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    }
}

impl Presenter for MeshPresenter {
    fn present(&mut self, params: &RenderParams) {
        self.beam = line_segment(
            Vec2::ZERO,
            params.beam_endpoint,
            self.style.beam_width,
            params.beam_color,
        );
        self.overlay = rect(
            Vec2::ZERO,
            Vec2::splat(self.style.overlay_size),
            params.overlay_color,
        );
        self.frames += 1;
    }
}
