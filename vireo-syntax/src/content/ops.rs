//! Typed content-stream operators.
//!
//! Each operator keyword is represented by a struct carrying its fixed
//! operand arity and types; [`TypedInstruction::dispatch`] checks both once,
//! at parse time of the operator token. Operands are read by position from
//! the top of the stack, so surplus operands further down are tolerated.

use crate::content::{Instruction, InlineImageData, OPERANDS_THRESHOLD, Stack};
use crate::object::array::Array;
use crate::object::name::Name;
use crate::object::number::Number;
use crate::object::string;
use crate::object::{Object, ObjectLike};
use smallvec::SmallVec;
use std::ops::Deref;

/// The reason an instruction could not be converted into a typed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperandError {
    /// The operator requires more operands than are present on the stack.
    StackUnderflow {
        /// The operator keyword.
        operator: &'static str,
        /// The number of operands the operator requires.
        expected: usize,
        /// The number of operands that were present.
        found: usize,
    },
    /// An operand is present but has the wrong kind for the operator.
    TypeMismatch {
        /// The operator keyword.
        operator: &'static str,
        /// The position of the offending operand, counted from the bottom
        /// of the operand window.
        index: usize,
    },
    /// The operator keyword is not known.
    UnknownOperator {
        /// The unrecognized keyword.
        operator: String,
    },
}

impl std::fmt::Display for OperandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StackUnderflow {
                operator,
                expected,
                found,
            } => write!(
                f,
                "operator {operator} requires {expected} operands, found {found}"
            ),
            Self::TypeMismatch { operator, index } => {
                write!(f, "operand {index} of operator {operator} has the wrong type")
            }
            Self::UnknownOperator { operator } => write!(f, "unknown operator {operator}"),
        }
    }
}

impl<'a> Stack<'a> {
    fn operand<T>(&self, operator: &'static str, arity: usize, index: usize) -> Result<T, OperandError>
    where
        T: ObjectLike<'a>,
    {
        self.from_top(arity, index)
            .ok_or(OperandError::TypeMismatch { operator, index })
    }

    fn numbers(&self, operator: &'static str) -> Result<SmallVec<[Number; OPERANDS_THRESHOLD]>, OperandError> {
        let mut numbers = SmallVec::new();

        for (index, object) in self.iter().enumerate() {
            match object.clone().into_number() {
                Some(n) => numbers.push(n),
                None => return Err(OperandError::TypeMismatch { operator, index }),
            }
        }

        Ok(numbers)
    }

    /// Numeric components optionally followed by a trailing pattern name,
    /// as used by the `SCN`/`scn` operators.
    fn numbers_and_name(
        &self,
        operator: &'static str,
    ) -> Result<(SmallVec<[Number; OPERANDS_THRESHOLD]>, Option<Name<'a>>), OperandError> {
        let mut numbers = SmallVec::new();
        let mut name = None;

        for (index, object) in self.iter().enumerate() {
            if let Some(n) = object.clone().into_number() {
                numbers.push(n);
            } else if index + 1 == self.len()
                && let Some(n) = object.clone().into_name()
            {
                name = Some(n);
            } else {
                return Err(OperandError::TypeMismatch { operator, index });
            }
        }

        Ok((numbers, name))
    }
}

pub(crate) trait OperatorTrait<'a>
where
    Self: Sized + Into<TypedInstruction<'a>>,
{
    const OPERATOR: &'static str;

    fn from_stack(stack: &Stack<'a>) -> Result<Self, OperandError>;
}

mod macros {
    macro_rules! op_impl {
        ($t:ident $(<$l:lifetime>),*, $e:expr, $n:expr, $body:expr) => {
            impl<'a> OperatorTrait<'a> for $t$(<$l>),* {
                const OPERATOR: &'static str = $e;

                fn from_stack(stack: &Stack<'a>) -> Result<Self, OperandError> {
                    let required: usize = $n;

                    if required != usize::MAX && stack.len() < required {
                        return Err(OperandError::StackUnderflow {
                            operator: $e,
                            expected: required,
                            found: stack.len(),
                        });
                    }

                    $body(stack)
                }
            }

            impl<'a> From<$t$(<$l>),*> for TypedInstruction<'a> {
                fn from(value: $t$(<$l>),*) -> Self {
                    TypedInstruction::$t(value)
                }
            }
        };
    }

    macro_rules! op0 {
        ($t:ident $(<$l:lifetime>),*, $e:expr) => {
            crate::content::ops::macros::op_impl!($t$(<$l>),*, $e, 0, |_| Ok(Self));
        }
    }

    macro_rules! op1 {
        ($t:ident $(<$l:lifetime>),*, $e:expr) => {
            crate::content::ops::macros::op_impl!($t$(<$l>),*, $e, 1, |stack: &Stack<'a>|
            Ok(Self(stack.operand($e, 1, 0)?)));
        }
    }

    macro_rules! op2 {
        ($t:ident $(<$l:lifetime>),*, $e:expr) => {
            crate::content::ops::macros::op_impl!($t$(<$l>),*, $e, 2, |stack: &Stack<'a>|
            Ok(Self(stack.operand($e, 2, 0)?, stack.operand($e, 2, 1)?)));
        }
    }

    macro_rules! op3 {
        ($t:ident $(<$l:lifetime>),*, $e:expr) => {
            crate::content::ops::macros::op_impl!($t$(<$l>),*, $e, 3, |stack: &Stack<'a>|
            Ok(Self(stack.operand($e, 3, 0)?, stack.operand($e, 3, 1)?,
            stack.operand($e, 3, 2)?)));
        }
    }

    macro_rules! op4 {
        ($t:ident $(<$l:lifetime>),*, $e:expr) => {
            crate::content::ops::macros::op_impl!($t$(<$l>),*, $e, 4, |stack: &Stack<'a>|
            Ok(Self(stack.operand($e, 4, 0)?, stack.operand($e, 4, 1)?,
            stack.operand($e, 4, 2)?, stack.operand($e, 4, 3)?)));
        }
    }

    macro_rules! op6 {
        ($t:ident $(<$l:lifetime>),*, $e:expr) => {
            crate::content::ops::macros::op_impl!($t$(<$l>),*, $e, 6, |stack: &Stack<'a>|
            Ok(Self(stack.operand($e, 6, 0)?, stack.operand($e, 6, 1)?,
            stack.operand($e, 6, 2)?, stack.operand($e, 6, 3)?,
            stack.operand($e, 6, 4)?, stack.operand($e, 6, 5)?)));
        }
    }

    macro_rules! op_all {
        ($t:ident $(<$l:lifetime>),*, $e:expr) => {
            crate::content::ops::macros::op_impl!($t$(<$l>),*, $e, usize::MAX, |stack: &Stack<'a>|
            Ok(Self(stack.numbers($e)?)));
        }
    }

    macro_rules! op_color_named {
        ($t:ident $(<$l:lifetime>),*, $e:expr) => {
            crate::content::ops::macros::op_impl!($t$(<$l>),*, $e, usize::MAX, |stack: &Stack<'a>| {
                let (numbers, name) = stack.numbers_and_name($e)?;
                Ok(Self(numbers, name))
            });
        }
    }

    pub(crate) use {op_all, op_color_named, op_impl, op0, op1, op2, op3, op4, op6};
}

use macros::{op_all, op_color_named, op0, op1, op2, op3, op4, op6};

// Special graphics state.

/// `q`: push a copy of the current graphics state.
#[derive(Debug)]
pub struct SaveState;
op0!(SaveState, "q");

/// `Q`: pop the graphics state stack.
#[derive(Debug)]
pub struct RestoreState;
op0!(RestoreState, "Q");

/// `cm`: concatenate a matrix onto the current transformation matrix.
#[derive(Debug)]
pub struct Transform(
    pub Number,
    pub Number,
    pub Number,
    pub Number,
    pub Number,
    pub Number,
);
op6!(Transform, "cm");

// General graphics state.

/// `w`: set the line width.
#[derive(Debug)]
pub struct LineWidth(pub Number);
op1!(LineWidth, "w");

/// `J`: set the line cap style.
#[derive(Debug)]
pub struct LineCap(pub Number);
op1!(LineCap, "J");

/// `j`: set the line join style.
#[derive(Debug)]
pub struct LineJoin(pub Number);
op1!(LineJoin, "j");

/// `M`: set the miter limit.
#[derive(Debug)]
pub struct MiterLimit(pub Number);
op1!(MiterLimit, "M");

/// `d`: set the dash array and phase.
#[derive(Debug)]
pub struct DashPattern<'a>(pub Array<'a>, pub Number);
op2!(DashPattern<'a>, "d");

/// `ri`: set the rendering intent.
#[derive(Debug)]
pub struct RenderingIntent<'a>(pub Name<'a>);
op1!(RenderingIntent<'a>, "ri");

/// `i`: set the flatness tolerance.
#[derive(Debug)]
pub struct FlatnessTolerance(pub Number);
op1!(FlatnessTolerance, "i");

/// `gs`: apply a named external graphics state.
#[derive(Debug)]
pub struct SetGraphicsState<'a>(pub Name<'a>);
op1!(SetGraphicsState<'a>, "gs");

// Path construction.

/// `m`: begin a new subpath.
#[derive(Debug)]
pub struct MoveTo(pub Number, pub Number);
op2!(MoveTo, "m");

/// `l`: append a straight line segment.
#[derive(Debug)]
pub struct LineTo(pub Number, pub Number);
op2!(LineTo, "l");

/// `c`: append a cubic segment with two control points.
#[derive(Debug)]
pub struct CubicTo(
    pub Number,
    pub Number,
    pub Number,
    pub Number,
    pub Number,
    pub Number,
);
op6!(CubicTo, "c");

/// `v`: append a cubic segment whose first control point is the current point.
#[derive(Debug)]
pub struct CubicStartTo(pub Number, pub Number, pub Number, pub Number);
op4!(CubicStartTo, "v");

/// `y`: append a cubic segment whose second control point is the end point.
#[derive(Debug)]
pub struct CubicEndTo(pub Number, pub Number, pub Number, pub Number);
op4!(CubicEndTo, "y");

/// `h`: close the current subpath.
#[derive(Debug)]
pub struct ClosePath;
op0!(ClosePath, "h");

/// `re`: append a closed rectangle subpath.
#[derive(Debug)]
pub struct RectPath(pub Number, pub Number, pub Number, pub Number);
op4!(RectPath, "re");

// Path painting.

/// `S`: stroke the path.
#[derive(Debug)]
pub struct StrokePath;
op0!(StrokePath, "S");

/// `s`: close and stroke the path.
#[derive(Debug)]
pub struct CloseAndStrokePath;
op0!(CloseAndStrokePath, "s");

/// `f`: fill the path using the nonzero winding rule.
#[derive(Debug)]
pub struct FillPathNonZero;
op0!(FillPathNonZero, "f");

/// `F`: obsolete equivalent of `f`.
#[derive(Debug)]
pub struct FillPathNonZeroCompatibility;
op0!(FillPathNonZeroCompatibility, "F");

/// `f*`: fill the path using the even-odd rule.
#[derive(Debug)]
pub struct FillPathEvenOdd;
op0!(FillPathEvenOdd, "f*");

/// `B`: fill and stroke the path using the nonzero winding rule.
#[derive(Debug)]
pub struct FillAndStrokeNonZero;
op0!(FillAndStrokeNonZero, "B");

/// `B*`: fill and stroke the path using the even-odd rule.
#[derive(Debug)]
pub struct FillAndStrokeEvenOdd;
op0!(FillAndStrokeEvenOdd, "B*");

/// `b`: close, fill and stroke the path using the nonzero winding rule.
#[derive(Debug)]
pub struct CloseFillAndStrokeNonZero;
op0!(CloseFillAndStrokeNonZero, "b");

/// `b*`: close, fill and stroke the path using the even-odd rule.
#[derive(Debug)]
pub struct CloseFillAndStrokeEvenOdd;
op0!(CloseFillAndStrokeEvenOdd, "b*");

/// `n`: end the path without painting it.
#[derive(Debug)]
pub struct EndPath;
op0!(EndPath, "n");

// Clipping.

/// `W`: mark the path as the pending clip, nonzero winding rule.
#[derive(Debug)]
pub struct ClipNonZero;
op0!(ClipNonZero, "W");

/// `W*`: mark the path as the pending clip, even-odd rule.
#[derive(Debug)]
pub struct ClipEvenOdd;
op0!(ClipEvenOdd, "W*");

// Color.

/// `CS`: select the stroke color space by name.
#[derive(Debug)]
pub struct ColorSpaceStroke<'a>(pub Name<'a>);
op1!(ColorSpaceStroke<'a>, "CS");

/// `cs`: select the fill color space by name.
#[derive(Debug)]
pub struct ColorSpaceNonStroke<'a>(pub Name<'a>);
op1!(ColorSpaceNonStroke<'a>, "cs");

/// `SC`: set the stroke color components.
#[derive(Debug)]
pub struct StrokeColor(pub SmallVec<[Number; OPERANDS_THRESHOLD]>);
op_all!(StrokeColor, "SC");

/// `sc`: set the fill color components.
#[derive(Debug)]
pub struct NonStrokeColor(pub SmallVec<[Number; OPERANDS_THRESHOLD]>);
op_all!(NonStrokeColor, "sc");

/// `SCN`: set the stroke color components, optionally naming a pattern.
#[derive(Debug)]
pub struct StrokeColorNamed<'a>(
    pub SmallVec<[Number; OPERANDS_THRESHOLD]>,
    pub Option<Name<'a>>,
);
op_color_named!(StrokeColorNamed<'a>, "SCN");

/// `scn`: set the fill color components, optionally naming a pattern.
#[derive(Debug)]
pub struct NonStrokeColorNamed<'a>(
    pub SmallVec<[Number; OPERANDS_THRESHOLD]>,
    pub Option<Name<'a>>,
);
op_color_named!(NonStrokeColorNamed<'a>, "scn");

/// `G`: set the stroke color space to device gray and set the gray level.
#[derive(Debug)]
pub struct StrokeColorDeviceGray(pub Number);
op1!(StrokeColorDeviceGray, "G");

/// `g`: set the fill color space to device gray and set the gray level.
#[derive(Debug)]
pub struct NonStrokeColorDeviceGray(pub Number);
op1!(NonStrokeColorDeviceGray, "g");

/// `RG`: set the stroke color space to device RGB and set the components.
#[derive(Debug)]
pub struct StrokeColorDeviceRgb(pub Number, pub Number, pub Number);
op3!(StrokeColorDeviceRgb, "RG");

/// `rg`: set the fill color space to device RGB and set the components.
#[derive(Debug)]
pub struct NonStrokeColorDeviceRgb(pub Number, pub Number, pub Number);
op3!(NonStrokeColorDeviceRgb, "rg");

/// `K`: set the stroke color space to device CMYK and set the components.
#[derive(Debug)]
pub struct StrokeColorCmyk(pub Number, pub Number, pub Number, pub Number);
op4!(StrokeColorCmyk, "K");

/// `k`: set the fill color space to device CMYK and set the components.
#[derive(Debug)]
pub struct NonStrokeColorCmyk(pub Number, pub Number, pub Number, pub Number);
op4!(NonStrokeColorCmyk, "k");

// Shading, XObjects and inline images.

/// `sh`: paint a named shading.
#[derive(Debug)]
pub struct Shading<'a>(pub Name<'a>);
op1!(Shading<'a>, "sh");

/// `Do`: invoke a named external object.
#[derive(Debug)]
pub struct XObject<'a>(pub Name<'a>);
op1!(XObject<'a>, "Do");

/// `BI`: draw an inline image. The lexer assembles the dictionary and the
/// raw data between `ID` and `EI` into a single operand.
#[derive(Debug)]
pub struct InlineImage<'a>(pub InlineImageData<'a>);
op1!(InlineImage<'a>, "BI");

/// `ID`: begin of inline image data. Consumed by the lexer; a stray
/// occurrence is a no-op.
#[derive(Debug)]
pub struct BeginInlineImageData;
op0!(BeginInlineImageData, "ID");

/// `EI`: end of inline image data. Consumed by the lexer; a stray
/// occurrence is a no-op.
#[derive(Debug)]
pub struct EndInlineImage;
op0!(EndInlineImage, "EI");

// Text objects.

/// `BT`: begin a text object and reset the text matrices.
#[derive(Debug)]
pub struct BeginText;
op0!(BeginText, "BT");

/// `ET`: end the current text object.
#[derive(Debug)]
pub struct EndText;
op0!(EndText, "ET");

// Text state.

/// `Tc`: set the character spacing.
#[derive(Debug)]
pub struct CharacterSpacing(pub Number);
op1!(CharacterSpacing, "Tc");

/// `Tw`: set the word spacing.
#[derive(Debug)]
pub struct WordSpacing(pub Number);
op1!(WordSpacing, "Tw");

/// `Tz`: set the horizontal scaling, in percent.
#[derive(Debug)]
pub struct HorizontalScaling(pub Number);
op1!(HorizontalScaling, "Tz");

/// `TL`: set the text leading.
#[derive(Debug)]
pub struct TextLeading(pub Number);
op1!(TextLeading, "TL");

/// `Tf`: select a font and size.
#[derive(Debug)]
pub struct TextFont<'a>(pub Name<'a>, pub Number);
op2!(TextFont<'a>, "Tf");

/// `Tr`: set the text rendering mode.
#[derive(Debug)]
pub struct TextRenderingMode(pub Number);
op1!(TextRenderingMode, "Tr");

/// `Ts`: set the text rise.
#[derive(Debug)]
pub struct TextRise(pub Number);
op1!(TextRise, "Ts");

// Text positioning.

/// `Td`: move to the start of the next line, offset from the current one.
#[derive(Debug)]
pub struct NextLine(pub Number, pub Number);
op2!(NextLine, "Td");

/// `TD`: like `Td`, but also sets the leading to the negated y offset.
#[derive(Debug)]
pub struct NextLineAndSetLeading(pub Number, pub Number);
op2!(NextLineAndSetLeading, "TD");

/// `Tm`: set the text matrix and the text line matrix.
#[derive(Debug)]
pub struct SetTextMatrix(
    pub Number,
    pub Number,
    pub Number,
    pub Number,
    pub Number,
    pub Number,
);
op6!(SetTextMatrix, "Tm");

/// `T*`: move to the start of the next line using the current leading.
#[derive(Debug)]
pub struct NextLineUsingLeading;
op0!(NextLineUsingLeading, "T*");

// Text showing.

/// `Tj`: show a text string.
#[derive(Debug)]
pub struct ShowText<'a>(pub string::String<'a>);
op1!(ShowText<'a>, "Tj");

/// `'`: move to the next line and show a text string.
#[derive(Debug)]
pub struct NextLineAndShowText<'a>(pub string::String<'a>);
op1!(NextLineAndShowText<'a>, "'");

/// `"`: set the word and character spacing, move to the next line and show
/// a text string.
#[derive(Debug)]
pub struct ShowTextWithParameters<'a>(pub Number, pub Number, pub string::String<'a>);
op3!(ShowTextWithParameters<'a>, "\"");

/// `TJ`: show text strings interleaved with positioning adjustments.
#[derive(Debug)]
pub struct ShowTexts<'a>(pub Array<'a>);
op1!(ShowTexts<'a>, "TJ");

// Type 3 fonts.

/// `d0`: set the glyph advance for a color Type 3 glyph.
#[derive(Debug)]
pub struct ColorGlyph(pub Number, pub Number);
op2!(ColorGlyph, "d0");

/// `d1`: set the glyph advance and bounding box for a shape Type 3 glyph.
#[derive(Debug)]
pub struct ShapeGlyph(
    pub Number,
    pub Number,
    pub Number,
    pub Number,
    pub Number,
    pub Number,
);
op6!(ShapeGlyph, "d1");

// Marked content.

/// `MP`: a marked-content point.
#[derive(Debug)]
pub struct MarkedContentPoint<'a>(pub Name<'a>);
op1!(MarkedContentPoint<'a>, "MP");

/// `DP`: a marked-content point with a property list.
#[derive(Debug)]
pub struct MarkedContentPointWithProperties<'a>(pub Name<'a>, pub Object<'a>);
op2!(MarkedContentPointWithProperties<'a>, "DP");

/// `BMC`: begin a marked-content sequence.
#[derive(Debug)]
pub struct BeginMarkedContent<'a>(pub Name<'a>);
op1!(BeginMarkedContent<'a>, "BMC");

/// `BDC`: begin a marked-content sequence with a property list.
#[derive(Debug)]
pub struct BeginMarkedContentWithProperties<'a>(pub Name<'a>, pub Object<'a>);
op2!(BeginMarkedContentWithProperties<'a>, "BDC");

/// `EMC`: end a marked-content sequence.
#[derive(Debug)]
pub struct EndMarkedContent;
op0!(EndMarkedContent, "EMC");

// Compatibility.

/// `BX`: begin a compatibility section.
#[derive(Debug)]
pub struct BeginCompatibility;
op0!(BeginCompatibility, "BX");

/// `EX`: end a compatibility section.
#[derive(Debug)]
pub struct EndCompatibility;
op0!(EndCompatibility, "EX");

/// A typed instruction in a content stream.
#[derive(Debug)]
pub enum TypedInstruction<'a> {
    SaveState(SaveState),
    RestoreState(RestoreState),
    Transform(Transform),
    LineWidth(LineWidth),
    LineCap(LineCap),
    LineJoin(LineJoin),
    MiterLimit(MiterLimit),
    DashPattern(DashPattern<'a>),
    RenderingIntent(RenderingIntent<'a>),
    FlatnessTolerance(FlatnessTolerance),
    SetGraphicsState(SetGraphicsState<'a>),
    MoveTo(MoveTo),
    LineTo(LineTo),
    CubicTo(CubicTo),
    CubicStartTo(CubicStartTo),
    CubicEndTo(CubicEndTo),
    ClosePath(ClosePath),
    RectPath(RectPath),
    StrokePath(StrokePath),
    CloseAndStrokePath(CloseAndStrokePath),
    FillPathNonZero(FillPathNonZero),
    FillPathNonZeroCompatibility(FillPathNonZeroCompatibility),
    FillPathEvenOdd(FillPathEvenOdd),
    FillAndStrokeNonZero(FillAndStrokeNonZero),
    FillAndStrokeEvenOdd(FillAndStrokeEvenOdd),
    CloseFillAndStrokeNonZero(CloseFillAndStrokeNonZero),
    CloseFillAndStrokeEvenOdd(CloseFillAndStrokeEvenOdd),
    EndPath(EndPath),
    ClipNonZero(ClipNonZero),
    ClipEvenOdd(ClipEvenOdd),
    ColorSpaceStroke(ColorSpaceStroke<'a>),
    ColorSpaceNonStroke(ColorSpaceNonStroke<'a>),
    StrokeColor(StrokeColor),
    NonStrokeColor(NonStrokeColor),
    StrokeColorNamed(StrokeColorNamed<'a>),
    NonStrokeColorNamed(NonStrokeColorNamed<'a>),
    StrokeColorDeviceGray(StrokeColorDeviceGray),
    NonStrokeColorDeviceGray(NonStrokeColorDeviceGray),
    StrokeColorDeviceRgb(StrokeColorDeviceRgb),
    NonStrokeColorDeviceRgb(NonStrokeColorDeviceRgb),
    StrokeColorCmyk(StrokeColorCmyk),
    NonStrokeColorCmyk(NonStrokeColorCmyk),
    Shading(Shading<'a>),
    XObject(XObject<'a>),
    InlineImage(InlineImage<'a>),
    BeginInlineImageData(BeginInlineImageData),
    EndInlineImage(EndInlineImage),
    BeginText(BeginText),
    EndText(EndText),
    CharacterSpacing(CharacterSpacing),
    WordSpacing(WordSpacing),
    HorizontalScaling(HorizontalScaling),
    TextLeading(TextLeading),
    TextFont(TextFont<'a>),
    TextRenderingMode(TextRenderingMode),
    TextRise(TextRise),
    NextLine(NextLine),
    NextLineAndSetLeading(NextLineAndSetLeading),
    SetTextMatrix(SetTextMatrix),
    NextLineUsingLeading(NextLineUsingLeading),
    ShowText(ShowText<'a>),
    NextLineAndShowText(NextLineAndShowText<'a>),
    ShowTextWithParameters(ShowTextWithParameters<'a>),
    ShowTexts(ShowTexts<'a>),
    ColorGlyph(ColorGlyph),
    ShapeGlyph(ShapeGlyph),
    MarkedContentPoint(MarkedContentPoint<'a>),
    MarkedContentPointWithProperties(MarkedContentPointWithProperties<'a>),
    BeginMarkedContent(BeginMarkedContent<'a>),
    BeginMarkedContentWithProperties(BeginMarkedContentWithProperties<'a>),
    EndMarkedContent(EndMarkedContent),
    BeginCompatibility(BeginCompatibility),
    EndCompatibility(EndCompatibility),
}

impl<'a> TypedInstruction<'a> {
    /// Convert an instruction into its typed form, checking operand arity
    /// and types.
    pub fn dispatch(instruction: &Instruction<'a>) -> Result<TypedInstruction<'a>, OperandError> {
        fn t<'a, T: OperatorTrait<'a>>(
            stack: &Stack<'a>,
        ) -> Result<TypedInstruction<'a>, OperandError> {
            T::from_stack(stack).map(Into::into)
        }

        let stack = &instruction.operands;

        match instruction.operator.deref() {
            b"q" => t::<SaveState>(stack),
            b"Q" => t::<RestoreState>(stack),
            b"cm" => t::<Transform>(stack),
            b"w" => t::<LineWidth>(stack),
            b"J" => t::<LineCap>(stack),
            b"j" => t::<LineJoin>(stack),
            b"M" => t::<MiterLimit>(stack),
            b"d" => t::<DashPattern<'_>>(stack),
            b"ri" => t::<RenderingIntent<'_>>(stack),
            b"i" => t::<FlatnessTolerance>(stack),
            b"gs" => t::<SetGraphicsState<'_>>(stack),
            b"m" => t::<MoveTo>(stack),
            b"l" => t::<LineTo>(stack),
            b"c" => t::<CubicTo>(stack),
            b"v" => t::<CubicStartTo>(stack),
            b"y" => t::<CubicEndTo>(stack),
            b"h" => t::<ClosePath>(stack),
            b"re" => t::<RectPath>(stack),
            b"S" => t::<StrokePath>(stack),
            b"s" => t::<CloseAndStrokePath>(stack),
            b"f" => t::<FillPathNonZero>(stack),
            b"F" => t::<FillPathNonZeroCompatibility>(stack),
            b"f*" => t::<FillPathEvenOdd>(stack),
            b"B" => t::<FillAndStrokeNonZero>(stack),
            b"B*" => t::<FillAndStrokeEvenOdd>(stack),
            b"b" => t::<CloseFillAndStrokeNonZero>(stack),
            b"b*" => t::<CloseFillAndStrokeEvenOdd>(stack),
            b"n" => t::<EndPath>(stack),
            b"W" => t::<ClipNonZero>(stack),
            b"W*" => t::<ClipEvenOdd>(stack),
            b"CS" => t::<ColorSpaceStroke<'_>>(stack),
            b"cs" => t::<ColorSpaceNonStroke<'_>>(stack),
            b"SC" => t::<StrokeColor>(stack),
            b"sc" => t::<NonStrokeColor>(stack),
            b"SCN" => t::<StrokeColorNamed<'_>>(stack),
            b"scn" => t::<NonStrokeColorNamed<'_>>(stack),
            b"G" => t::<StrokeColorDeviceGray>(stack),
            b"g" => t::<NonStrokeColorDeviceGray>(stack),
            b"RG" => t::<StrokeColorDeviceRgb>(stack),
            b"rg" => t::<NonStrokeColorDeviceRgb>(stack),
            b"K" => t::<StrokeColorCmyk>(stack),
            b"k" => t::<NonStrokeColorCmyk>(stack),
            b"sh" => t::<Shading<'_>>(stack),
            b"Do" => t::<XObject<'_>>(stack),
            b"BI" => t::<InlineImage<'_>>(stack),
            b"ID" => t::<BeginInlineImageData>(stack),
            b"EI" => t::<EndInlineImage>(stack),
            b"BT" => t::<BeginText>(stack),
            b"ET" => t::<EndText>(stack),
            b"Tc" => t::<CharacterSpacing>(stack),
            b"Tw" => t::<WordSpacing>(stack),
            b"Tz" => t::<HorizontalScaling>(stack),
            b"TL" => t::<TextLeading>(stack),
            b"Tf" => t::<TextFont<'_>>(stack),
            b"Tr" => t::<TextRenderingMode>(stack),
            b"Ts" => t::<TextRise>(stack),
            b"Td" => t::<NextLine>(stack),
            b"TD" => t::<NextLineAndSetLeading>(stack),
            b"Tm" => t::<SetTextMatrix>(stack),
            b"T*" => t::<NextLineUsingLeading>(stack),
            b"Tj" => t::<ShowText<'_>>(stack),
            b"'" => t::<NextLineAndShowText<'_>>(stack),
            b"\"" => t::<ShowTextWithParameters<'_>>(stack),
            b"TJ" => t::<ShowTexts<'_>>(stack),
            b"d0" => t::<ColorGlyph>(stack),
            b"d1" => t::<ShapeGlyph>(stack),
            b"MP" => t::<MarkedContentPoint<'_>>(stack),
            b"DP" => t::<MarkedContentPointWithProperties<'_>>(stack),
            b"BMC" => t::<BeginMarkedContent<'_>>(stack),
            b"BDC" => t::<BeginMarkedContentWithProperties<'_>>(stack),
            b"EMC" => t::<EndMarkedContent>(stack),
            b"BX" => t::<BeginCompatibility>(stack),
            b"EX" => t::<EndCompatibility>(stack),
            op => Err(OperandError::UnknownOperator {
                operator: String::from_utf8_lossy(op).into_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::content::Instructions;
    use crate::content::ops::{OperandError, TypedInstruction};

    fn dispatch_single(data: &str) -> Result<TypedInstruction<'_>, OperandError> {
        let instruction = Instructions::new(data.as_bytes())
            .next()
            .unwrap()
            .unwrap();
        TypedInstruction::dispatch(&instruction)
    }

    #[test]
    fn dispatch_save_state() {
        assert!(matches!(
            dispatch_single("q").unwrap(),
            TypedInstruction::SaveState(_)
        ));
    }

    #[test]
    fn dispatch_transform() {
        let TypedInstruction::Transform(t) = dispatch_single("1 0 0 1 10 20 cm").unwrap() else {
            panic!("expected a transform");
        };
        assert_eq!(t.4.as_f32(), 10.0);
        assert_eq!(t.5.as_f32(), 20.0);
    }

    #[test]
    fn dispatch_underflow() {
        assert_eq!(
            dispatch_single("0 0 re").unwrap_err(),
            OperandError::StackUnderflow {
                operator: "re",
                expected: 4,
                found: 2
            }
        );
    }

    #[test]
    fn dispatch_type_mismatch() {
        assert_eq!(
            dispatch_single("0 0 (a) 10 re").unwrap_err(),
            OperandError::TypeMismatch {
                operator: "re",
                index: 2
            }
        );
    }

    #[test]
    fn dispatch_unknown() {
        assert_eq!(
            dispatch_single("vnd").unwrap_err(),
            OperandError::UnknownOperator {
                operator: "vnd".into()
            }
        );
    }

    #[test]
    fn dispatch_surplus_operands() {
        // The required operands are read from the top of the stack.
        let TypedInstruction::LineWidth(w) = dispatch_single("7 3 w").unwrap() else {
            panic!("expected a line width");
        };
        assert_eq!(w.0.as_f32(), 3.0);
    }

    #[test]
    fn dispatch_color_named() {
        let TypedInstruction::NonStrokeColorNamed(c) = dispatch_single("0.5 /P1 scn").unwrap()
        else {
            panic!("expected a named fill color");
        };
        assert_eq!(c.0.len(), 1);
        assert_eq!(c.1.as_ref().unwrap().as_str(), "P1");
    }

    #[test]
    fn dispatch_show_text_with_parameters() {
        assert!(matches!(
            dispatch_single("1 2 (x) \"").unwrap(),
            TypedInstruction::ShowTextWithParameters(_)
        ));
    }
}
