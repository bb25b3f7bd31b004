//! Operation enumerations.
//!
//! Three of these overlap on purpose: [`ArithmeticOp`] is the stable
//! SSA form, while the corresponding [`IntrinsicOp`] entries exist for
//! frontend shapes and round-tripping. A later pass may canonicalize
//! intrinsics to arithmetic where the semantics match. Likewise
//! [`AtomicOp`] is canonical and the `Atomic*` intrinsic entries are
//! kept only for ingestion.

use crate::core::types::Type;

macro_rules! op_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident => $s:literal,)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant,)+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $s,)+
                }
            }

            pub fn from_str(s: &str) -> Option<Self> {
                match s {
                    $($s => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocSpace {
    /// Per-invocation storage.
    Local,
    /// Per-thread-group storage.
    Shared,
}

op_enum! {
    pub enum CastOp {
        StaticCast => "static_cast",
        BitwiseCast => "bitwise_cast",
    }
}

op_enum! {
    /// Scalar/vector operations with sign-correct numeric semantics.
    pub enum ArithmeticOp {
        UnaryPlus => "plus",
        UnaryMinus => "neg",
        UnaryLogicNot => "not",
        UnaryBitNot => "bit_not",
        BinaryAdd => "add",
        BinarySub => "sub",
        BinaryMul => "mul",
        BinaryDiv => "div",
        BinaryMod => "mod",
        BinaryLogicAnd => "logic_and",
        BinaryLogicOr => "logic_or",
        BinaryBitAnd => "bit_and",
        BinaryBitOr => "bit_or",
        BinaryBitXor => "bit_xor",
        BinaryShiftLeft => "shl",
        BinaryShiftRight => "shr",
        BinaryRotateLeft => "rol",
        BinaryRotateRight => "ror",
        BinaryLess => "lt",
        BinaryGreater => "gt",
        BinaryLessEqual => "le",
        BinaryGreaterEqual => "ge",
        BinaryEqual => "eq",
        BinaryNotEqual => "ne",
        All => "all",
        Any => "any",
        Select => "select",
        Clamp => "clamp",
        Saturate => "saturate",
        Lerp => "lerp",
        SmoothStep => "smoothstep",
        Step => "step",
        Abs => "abs",
        Min => "min",
        Max => "max",
        Clz => "clz",
        Ctz => "ctz",
        PopCount => "popcount",
        Reverse => "reverse",
        IsInf => "isinf",
        IsNan => "isnan",
        Acos => "acos",
        Acosh => "acosh",
        Asin => "asin",
        Asinh => "asinh",
        Atan => "atan",
        Atan2 => "atan2",
        Atanh => "atanh",
        Cos => "cos",
        Cosh => "cosh",
        Sin => "sin",
        Sinh => "sinh",
        Tan => "tan",
        Tanh => "tanh",
        Exp => "exp",
        Exp2 => "exp2",
        Exp10 => "exp10",
        Log => "log",
        Log2 => "log2",
        Log10 => "log10",
        Pow => "pow",
        PowInt => "pow_int",
        Sqrt => "sqrt",
        Rsqrt => "rsqrt",
        Ceil => "ceil",
        Floor => "floor",
        Fract => "fract",
        Trunc => "trunc",
        Round => "round",
        Rint => "rint",
        Fma => "fma",
        CopySign => "copysign",
        Cross => "cross",
        Dot => "dot",
        Length => "length",
        LengthSquared => "length_squared",
        Normalize => "normalize",
        FaceForward => "faceforward",
        Reflect => "reflect",
        ReduceSum => "reduce_sum",
        ReduceProduct => "reduce_product",
        ReduceMin => "reduce_min",
        ReduceMax => "reduce_max",
        OuterProduct => "outer_product",
        MatrixCompNeg => "matrix_comp_neg",
        MatrixCompAdd => "matrix_comp_add",
        MatrixCompSub => "matrix_comp_sub",
        MatrixCompMul => "matrix_comp_mul",
        MatrixCompDiv => "matrix_comp_div",
        MatrixLinalgMul => "matrix_linalg_mul",
        MatrixDeterminant => "matrix_determinant",
        MatrixTranspose => "matrix_transpose",
        MatrixInverse => "matrix_inverse",
        Aggregate => "aggregate",
        Shuffle => "shuffle",
        Insert => "insert",
        Extract => "extract",
    }
}

op_enum! {
    pub enum AtomicOp {
        Exchange => "exchange",
        CompareExchange => "compare_exchange",
        FetchAdd => "fetch_add",
        FetchSub => "fetch_sub",
        FetchAnd => "fetch_and",
        FetchOr => "fetch_or",
        FetchXor => "fetch_xor",
        FetchMin => "fetch_min",
        FetchMax => "fetch_max",
    }
}

impl AtomicOp {
    /// Compare-exchange carries (expected, desired); everything else
    /// carries one value operand.
    pub fn value_count(self) -> usize {
        if self == AtomicOp::CompareExchange {
            2
        } else {
            1
        }
    }
}

op_enum! {
    pub enum ThreadGroupOp {
        ShaderExecutionReorder => "shader_execution_reorder",
        RasterQuadDdx => "raster_quad_ddx",
        RasterQuadDdy => "raster_quad_ddy",
        WarpIsFirstActiveLane => "warp_is_first_active_lane",
        WarpFirstActiveLane => "warp_first_active_lane",
        WarpActiveAllEqual => "warp_active_all_equal",
        WarpActiveBitAnd => "warp_active_bit_and",
        WarpActiveBitOr => "warp_active_bit_or",
        WarpActiveBitXor => "warp_active_bit_xor",
        WarpActiveCountBits => "warp_active_count_bits",
        WarpActiveMax => "warp_active_max",
        WarpActiveMin => "warp_active_min",
        WarpActiveProduct => "warp_active_product",
        WarpActiveSum => "warp_active_sum",
        WarpActiveAll => "warp_active_all",
        WarpActiveAny => "warp_active_any",
        WarpActiveBitMask => "warp_active_bit_mask",
        WarpPrefixCountBits => "warp_prefix_count_bits",
        WarpPrefixSum => "warp_prefix_sum",
        WarpPrefixProduct => "warp_prefix_product",
        WarpReadLane => "warp_read_lane",
        WarpReadFirstActiveLane => "warp_read_first_active_lane",
        SynchronizeBlock => "synchronize_block",
    }
}

op_enum! {
    /// Typed size/sample/address queries over resources. Sampling is
    /// assumed unaffected by resource writes in the same shader.
    pub enum ResourceQueryOp {
        BufferSize => "buffer_size",
        ByteBufferSize => "byte_buffer_size",
        Texture2dSize => "texture2d_size",
        Texture3dSize => "texture3d_size",
        BindlessBufferSize => "bindless_buffer_size",
        BindlessByteBufferSize => "bindless_byte_buffer_size",
        BindlessTexture2dSize => "bindless_texture2d_size",
        BindlessTexture3dSize => "bindless_texture3d_size",
        BindlessTexture2dSizeLevel => "bindless_texture2d_size_level",
        BindlessTexture3dSizeLevel => "bindless_texture3d_size_level",
        Texture2dSample => "texture2d_sample",
        Texture2dSampleLevel => "texture2d_sample_level",
        Texture2dSampleGrad => "texture2d_sample_grad",
        Texture2dSampleGradLevel => "texture2d_sample_grad_level",
        Texture3dSample => "texture3d_sample",
        Texture3dSampleLevel => "texture3d_sample_level",
        Texture3dSampleGrad => "texture3d_sample_grad",
        Texture3dSampleGradLevel => "texture3d_sample_grad_level",
        BindlessTexture2dSample => "bindless_texture2d_sample",
        BindlessTexture2dSampleLevel => "bindless_texture2d_sample_level",
        BindlessTexture2dSampleGrad => "bindless_texture2d_sample_grad",
        BindlessTexture2dSampleGradLevel => "bindless_texture2d_sample_grad_level",
        BindlessTexture3dSample => "bindless_texture3d_sample",
        BindlessTexture3dSampleLevel => "bindless_texture3d_sample_level",
        BindlessTexture3dSampleGrad => "bindless_texture3d_sample_grad",
        BindlessTexture3dSampleGradLevel => "bindless_texture3d_sample_grad_level",
        BindlessTexture2dSampleSampler => "bindless_texture2d_sample_sampler",
        BindlessTexture2dSampleLevelSampler => "bindless_texture2d_sample_level_sampler",
        BindlessTexture2dSampleGradSampler => "bindless_texture2d_sample_grad_sampler",
        BindlessTexture2dSampleGradLevelSampler => "bindless_texture2d_sample_grad_level_sampler",
        BindlessTexture3dSampleSampler => "bindless_texture3d_sample_sampler",
        BindlessTexture3dSampleLevelSampler => "bindless_texture3d_sample_level_sampler",
        BindlessTexture3dSampleGradSampler => "bindless_texture3d_sample_grad_sampler",
        BindlessTexture3dSampleGradLevelSampler => "bindless_texture3d_sample_grad_level_sampler",
        BufferDeviceAddress => "buffer_device_address",
        BindlessBufferDeviceAddress => "bindless_buffer_device_address",
        RayTracingInstanceTransform => "ray_tracing_instance_transform",
        RayTracingInstanceUserId => "ray_tracing_instance_user_id",
        RayTracingInstanceVisibilityMask => "ray_tracing_instance_visibility_mask",
        RayTracingTraceClosest => "ray_tracing_trace_closest",
        RayTracingTraceAny => "ray_tracing_trace_any",
        RayTracingQueryAll => "ray_tracing_query_all",
        RayTracingQueryAny => "ray_tracing_query_any",
        RayTracingInstanceMotionMatrix => "ray_tracing_instance_motion_matrix",
        RayTracingInstanceMotionSrt => "ray_tracing_instance_motion_srt",
        RayTracingTraceClosestMotionBlur => "ray_tracing_trace_closest_motion_blur",
        RayTracingTraceAnyMotionBlur => "ray_tracing_trace_any_motion_blur",
        RayTracingQueryAllMotionBlur => "ray_tracing_query_all_motion_blur",
        RayTracingQueryAnyMotionBlur => "ray_tracing_query_any_motion_blur",
    }
}

op_enum! {
    pub enum ResourceReadOp {
        BufferRead => "buffer_read",
        ByteBufferRead => "byte_buffer_read",
        Texture2dRead => "texture2d_read",
        Texture3dRead => "texture3d_read",
        BindlessBufferRead => "bindless_buffer_read",
        BindlessByteBufferRead => "bindless_byte_buffer_read",
        BindlessTexture2dRead => "bindless_texture2d_read",
        BindlessTexture3dRead => "bindless_texture3d_read",
        BindlessTexture2dReadLevel => "bindless_texture2d_read_level",
        BindlessTexture3dReadLevel => "bindless_texture3d_read_level",
        DeviceAddressRead => "device_address_read",
    }
}

op_enum! {
    pub enum ResourceWriteOp {
        BufferWrite => "buffer_write",
        ByteBufferWrite => "byte_buffer_write",
        Texture2dWrite => "texture2d_write",
        Texture3dWrite => "texture3d_write",
        BindlessBufferWrite => "bindless_buffer_write",
        BindlessByteBufferWrite => "bindless_byte_buffer_write",
        DeviceAddressWrite => "device_address_write",
        RayTracingSetInstanceTransform => "ray_tracing_set_instance_transform",
        RayTracingSetInstanceVisibilityMask => "ray_tracing_set_instance_visibility_mask",
        RayTracingSetInstanceOpacity => "ray_tracing_set_instance_opacity",
        RayTracingSetInstanceUserId => "ray_tracing_set_instance_user_id",
        RayTracingSetInstanceMotionMatrix => "ray_tracing_set_instance_motion_matrix",
        RayTracingSetInstanceMotionSrt => "ray_tracing_set_instance_motion_srt",
        IndirectDispatchSetKernel => "indirect_dispatch_set_kernel",
        IndirectDispatchSetCount => "indirect_dispatch_set_count",
    }
}

op_enum! {
    pub enum RayQueryObjectReadOp {
        WorldSpaceRay => "world_space_ray",
        ProceduralCandidateHit => "procedural_candidate_hit",
        TriangleCandidateHit => "triangle_candidate_hit",
        CommittedHit => "committed_hit",
        IsTriangleCandidate => "is_triangle_candidate",
        IsProceduralCandidate => "is_procedural_candidate",
        IsTerminated => "is_terminated",
    }
}

op_enum! {
    pub enum RayQueryObjectWriteOp {
        CommitTriangle => "commit_triangle",
        CommitProcedural => "commit_procedural",
        Terminate => "terminate",
        Proceed => "proceed",
    }
}

op_enum! {
    pub enum SpecialRegisterTag {
        ThreadId => "thread_id",
        BlockId => "block_id",
        WarpLaneId => "warp_lane_id",
        DispatchId => "dispatch_id",
        KernelId => "kernel_id",
        ObjectId => "object_id",
        BlockSize => "block_size",
        WarpSize => "warp_size",
        DispatchSize => "dispatch_size",
    }
}

impl SpecialRegisterTag {
    pub fn register_type(self) -> &'static Type {
        match self {
            SpecialRegisterTag::WarpLaneId
            | SpecialRegisterTag::KernelId
            | SpecialRegisterTag::ObjectId
            | SpecialRegisterTag::WarpSize => Type::uint32(),
            _ => Type::vector(Type::uint32(), 3),
        }
    }
}

op_enum! {
    /// Frontend-shaped operations over a span of value operands.
    pub enum IntrinsicOp {
        Nop => "nop",
        UnaryPlus => "unary_plus",
        UnaryMinus => "unary_minus",
        UnaryLogicNot => "unary_logic_not",
        UnaryBitNot => "unary_bit_not",
        BinaryAdd => "binary_add",
        BinarySub => "binary_sub",
        BinaryMul => "binary_mul",
        BinaryDiv => "binary_div",
        BinaryMod => "binary_mod",
        BinaryLogicAnd => "binary_logic_and",
        BinaryLogicOr => "binary_logic_or",
        BinaryBitAnd => "binary_bit_and",
        BinaryBitOr => "binary_bit_or",
        BinaryBitXor => "binary_bit_xor",
        BinaryShiftLeft => "binary_shift_left",
        BinaryShiftRight => "binary_shift_right",
        BinaryRotateLeft => "binary_rotate_left",
        BinaryRotateRight => "binary_rotate_right",
        BinaryLess => "binary_less",
        BinaryGreater => "binary_greater",
        BinaryLessEqual => "binary_less_equal",
        BinaryGreaterEqual => "binary_greater_equal",
        BinaryEqual => "binary_equal",
        BinaryNotEqual => "binary_not_equal",
        ThreadId => "thread_id",
        BlockId => "block_id",
        WarpLaneId => "warp_lane_id",
        DispatchId => "dispatch_id",
        KernelId => "kernel_id",
        ObjectId => "object_id",
        BlockSize => "block_size",
        WarpSize => "warp_size",
        DispatchSize => "dispatch_size",
        SynchronizeBlock => "synchronize_block",
        All => "all",
        Any => "any",
        Select => "select",
        Clamp => "clamp",
        Saturate => "saturate",
        Lerp => "lerp",
        SmoothStep => "smoothstep",
        Step => "step",
        Abs => "abs",
        Min => "min",
        Max => "max",
        Clz => "clz",
        Ctz => "ctz",
        PopCount => "popcount",
        Reverse => "reverse",
        IsInf => "isinf",
        IsNan => "isnan",
        Acos => "acos",
        Acosh => "acosh",
        Asin => "asin",
        Asinh => "asinh",
        Atan => "atan",
        Atan2 => "atan2",
        Atanh => "atanh",
        Cos => "cos",
        Cosh => "cosh",
        Sin => "sin",
        Sinh => "sinh",
        Tan => "tan",
        Tanh => "tanh",
        Exp => "exp",
        Exp2 => "exp2",
        Exp10 => "exp10",
        Log => "log",
        Log2 => "log2",
        Log10 => "log10",
        Pow => "pow",
        PowInt => "pow_int",
        Sqrt => "sqrt",
        Rsqrt => "rsqrt",
        Ceil => "ceil",
        Floor => "floor",
        Fract => "fract",
        Trunc => "trunc",
        Round => "round",
        Rint => "rint",
        Fma => "fma",
        CopySign => "copysign",
        Cross => "cross",
        Dot => "dot",
        Length => "length",
        LengthSquared => "length_squared",
        Normalize => "normalize",
        FaceForward => "faceforward",
        Reflect => "reflect",
        ReduceSum => "reduce_sum",
        ReduceProduct => "reduce_product",
        ReduceMin => "reduce_min",
        ReduceMax => "reduce_max",
        OuterProduct => "outer_product",
        MatrixCompNeg => "matrix_comp_neg",
        MatrixCompAdd => "matrix_comp_add",
        MatrixCompSub => "matrix_comp_sub",
        MatrixCompMul => "matrix_comp_mul",
        MatrixCompDiv => "matrix_comp_div",
        MatrixLinalgMul => "matrix_linalg_mul",
        MatrixDeterminant => "matrix_determinant",
        MatrixTranspose => "matrix_transpose",
        MatrixInverse => "matrix_inverse",
        AtomicExchange => "atomic_exchange",
        AtomicCompareExchange => "atomic_compare_exchange",
        AtomicFetchAdd => "atomic_fetch_add",
        AtomicFetchSub => "atomic_fetch_sub",
        AtomicFetchAnd => "atomic_fetch_and",
        AtomicFetchOr => "atomic_fetch_or",
        AtomicFetchXor => "atomic_fetch_xor",
        AtomicFetchMin => "atomic_fetch_min",
        AtomicFetchMax => "atomic_fetch_max",
        BufferRead => "buffer_read",
        BufferWrite => "buffer_write",
        BufferSize => "buffer_size",
        ByteBufferRead => "byte_buffer_read",
        ByteBufferWrite => "byte_buffer_write",
        ByteBufferSize => "byte_buffer_size",
        Texture2dRead => "texture2d_read",
        Texture2dWrite => "texture2d_write",
        Texture2dSize => "texture2d_size",
        Texture2dSample => "texture2d_sample",
        Texture2dSampleLevel => "texture2d_sample_level",
        Texture2dSampleGrad => "texture2d_sample_grad",
        Texture2dSampleGradLevel => "texture2d_sample_grad_level",
        Texture3dRead => "texture3d_read",
        Texture3dWrite => "texture3d_write",
        Texture3dSize => "texture3d_size",
        Texture3dSample => "texture3d_sample",
        Texture3dSampleLevel => "texture3d_sample_level",
        Texture3dSampleGrad => "texture3d_sample_grad",
        Texture3dSampleGradLevel => "texture3d_sample_grad_level",
        BindlessTexture2dSample => "bindless_texture2d_sample",
        BindlessTexture2dSampleLevel => "bindless_texture2d_sample_level",
        BindlessTexture2dSampleGrad => "bindless_texture2d_sample_grad",
        BindlessTexture2dSampleGradLevel => "bindless_texture2d_sample_grad_level",
        BindlessTexture3dSample => "bindless_texture3d_sample",
        BindlessTexture3dSampleLevel => "bindless_texture3d_sample_level",
        BindlessTexture3dSampleGrad => "bindless_texture3d_sample_grad",
        BindlessTexture3dSampleGradLevel => "bindless_texture3d_sample_grad_level",
        BindlessTexture2dSampleSampler => "bindless_texture2d_sample_sampler",
        BindlessTexture2dSampleLevelSampler => "bindless_texture2d_sample_level_sampler",
        BindlessTexture2dSampleGradSampler => "bindless_texture2d_sample_grad_sampler",
        BindlessTexture2dSampleGradLevelSampler => "bindless_texture2d_sample_grad_level_sampler",
        BindlessTexture3dSampleSampler => "bindless_texture3d_sample_sampler",
        BindlessTexture3dSampleLevelSampler => "bindless_texture3d_sample_level_sampler",
        BindlessTexture3dSampleGradSampler => "bindless_texture3d_sample_grad_sampler",
        BindlessTexture3dSampleGradLevelSampler => "bindless_texture3d_sample_grad_level_sampler",
        BindlessTexture2dRead => "bindless_texture2d_read",
        BindlessTexture3dRead => "bindless_texture3d_read",
        BindlessTexture2dReadLevel => "bindless_texture2d_read_level",
        BindlessTexture3dReadLevel => "bindless_texture3d_read_level",
        BindlessTexture2dSize => "bindless_texture2d_size",
        BindlessTexture3dSize => "bindless_texture3d_size",
        BindlessTexture2dSizeLevel => "bindless_texture2d_size_level",
        BindlessTexture3dSizeLevel => "bindless_texture3d_size_level",
        BindlessBufferRead => "bindless_buffer_read",
        BindlessBufferWrite => "bindless_buffer_write",
        BindlessBufferSize => "bindless_buffer_size",
        BindlessBufferType => "bindless_buffer_type",
        BindlessByteBufferRead => "bindless_byte_buffer_read",
        BindlessByteBufferWrite => "bindless_byte_buffer_write",
        BindlessByteBufferSize => "bindless_byte_buffer_size",
        BufferDeviceAddress => "buffer_device_address",
        BindlessBufferDeviceAddress => "bindless_buffer_device_address",
        DeviceAddressRead => "device_address_read",
        DeviceAddressWrite => "device_address_write",
        Aggregate => "aggregate",
        Shuffle => "shuffle",
        Insert => "insert",
        Extract => "extract",
        AutodiffRequiresGradient => "autodiff_requires_gradient",
        AutodiffGradient => "autodiff_gradient",
        AutodiffGradientMarker => "autodiff_gradient_marker",
        AutodiffAccumulateGradient => "autodiff_accumulate_gradient",
        AutodiffBackward => "autodiff_backward",
        AutodiffDetach => "autodiff_detach",
        RayTracingInstanceTransform => "ray_tracing_instance_transform",
        RayTracingInstanceUserId => "ray_tracing_instance_user_id",
        RayTracingInstanceVisibilityMask => "ray_tracing_instance_visibility_mask",
        RayTracingSetInstanceTransform => "ray_tracing_set_instance_transform",
        RayTracingSetInstanceVisibilityMask => "ray_tracing_set_instance_visibility_mask",
        RayTracingSetInstanceOpacity => "ray_tracing_set_instance_opacity",
        RayTracingSetInstanceUserId => "ray_tracing_set_instance_user_id",
        RayTracingTraceClosest => "ray_tracing_trace_closest",
        RayTracingTraceAny => "ray_tracing_trace_any",
        RayTracingQueryAll => "ray_tracing_query_all",
        RayTracingQueryAny => "ray_tracing_query_any",
        RayTracingInstanceMotionMatrix => "ray_tracing_instance_motion_matrix",
        RayTracingInstanceMotionSrt => "ray_tracing_instance_motion_srt",
        RayTracingSetInstanceMotionMatrix => "ray_tracing_set_instance_motion_matrix",
        RayTracingSetInstanceMotionSrt => "ray_tracing_set_instance_motion_srt",
        RayTracingTraceClosestMotionBlur => "ray_tracing_trace_closest_motion_blur",
        RayTracingTraceAnyMotionBlur => "ray_tracing_trace_any_motion_blur",
        RayTracingQueryAllMotionBlur => "ray_tracing_query_all_motion_blur",
        RayTracingQueryAnyMotionBlur => "ray_tracing_query_any_motion_blur",
        RayQueryWorldSpaceRay => "ray_query_world_space_ray",
        RayQueryProceduralCandidateHit => "ray_query_procedural_candidate_hit",
        RayQueryTriangleCandidateHit => "ray_query_triangle_candidate_hit",
        RayQueryCommittedHit => "ray_query_committed_hit",
        RayQueryCommitTriangle => "ray_query_commit_triangle",
        RayQueryCommitProcedural => "ray_query_commit_procedural",
        RayQueryTerminate => "ray_query_terminate",
        RayQueryProceed => "ray_query_proceed",
        RayQueryIsTriangleCandidate => "ray_query_is_triangle_candidate",
        RayQueryIsProceduralCandidate => "ray_query_is_procedural_candidate",
        RasterDiscard => "raster_discard",
        RasterDdx => "raster_ddx",
        RasterDdy => "raster_ddy",
        WarpIsFirstActiveLane => "warp_is_first_active_lane",
        WarpFirstActiveLane => "warp_first_active_lane",
        WarpActiveAllEqual => "warp_active_all_equal",
        WarpActiveBitAnd => "warp_active_bit_and",
        WarpActiveBitOr => "warp_active_bit_or",
        WarpActiveBitXor => "warp_active_bit_xor",
        WarpActiveCountBits => "warp_active_count_bits",
        WarpActiveMax => "warp_active_max",
        WarpActiveMin => "warp_active_min",
        WarpActiveProduct => "warp_active_product",
        WarpActiveSum => "warp_active_sum",
        WarpActiveAll => "warp_active_all",
        WarpActiveAny => "warp_active_any",
        WarpActiveBitMask => "warp_active_bit_mask",
        WarpPrefixCountBits => "warp_prefix_count_bits",
        WarpPrefixSum => "warp_prefix_sum",
        WarpPrefixProduct => "warp_prefix_product",
        WarpReadLane => "warp_read_lane",
        WarpReadFirstActiveLane => "warp_read_first_active_lane",
        IndirectDispatchSetKernel => "indirect_dispatch_set_kernel",
        IndirectDispatchSetCount => "indirect_dispatch_set_count",
        ShaderExecutionReorder => "shader_execution_reorder",
    }
}

impl IntrinsicOp {
    /// Whether the operation is observable-effect free, so an unused
    /// result makes the whole call dead. Kept as an attribute of the
    /// op rather than a list inside any particular pass.
    pub fn is_pure(self) -> bool {
        matches!(
            self,
            IntrinsicOp::Nop
                | IntrinsicOp::AutodiffGradient
                | IntrinsicOp::RayQueryWorldSpaceRay
                | IntrinsicOp::RayQueryProceduralCandidateHit
                | IntrinsicOp::RayQueryTriangleCandidateHit
                | IntrinsicOp::RayQueryIsTriangleCandidate
                | IntrinsicOp::RayQueryIsProceduralCandidate
        )
    }
}
