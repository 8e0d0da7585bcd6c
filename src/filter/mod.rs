//! Exclusion of framework-managed symbols
//!
//! Fields and methods carrying ORM, validation, serialization or UI-binding
//! decorators are read and written by frameworks through reflection, so a
//! missing textual reference says nothing about whether they are used.

use crate::model::Symbol;
use std::collections::HashSet;

/// Decorators that exclude a symbol from usage analysis by default
pub const DEFAULT_EXCLUDE_DECORATORS: &[&str] = &[
    // TypeORM
    "Column",
    "PrimaryColumn",
    "PrimaryGeneratedColumn",
    "CreateDateColumn",
    "UpdateDateColumn",
    "DeleteDateColumn",
    "VersionColumn",
    "OneToOne",
    "OneToMany",
    "ManyToOne",
    "ManyToMany",
    "JoinColumn",
    "JoinTable",
    "RelationId",
    "Index",
    "Unique",
    "Check",
    "Exclusion",
    "Generated",
    "TreeParent",
    "TreeChildren",
    "Tree",
    "ViewColumn",
    "ViewEntity",
    // class-validator
    "IsString",
    "IsNumber",
    "IsInt",
    "IsBoolean",
    "IsArray",
    "IsEnum",
    "IsOptional",
    "IsNotEmpty",
    "IsEmail",
    "IsUrl",
    "IsUUID",
    "IsDate",
    "IsDateString",
    "IsObject",
    "IsPositive",
    "IsNegative",
    "Min",
    "Max",
    "MinLength",
    "MaxLength",
    "Length",
    "Matches",
    "Contains",
    "NotContains",
    "IsIn",
    "IsNotIn",
    "ArrayMinSize",
    "ArrayMaxSize",
    "ArrayNotEmpty",
    "ArrayUnique",
    "ValidateNested",
    "ValidateIf",
    "IsDefined",
    "Allow",
    // class-transformer
    "Type",
    "Transform",
    "Expose",
    "Exclude",
    "TransformPlainToClass",
    "TransformClassToPlain",
    // Swagger / OpenAPI
    "ApiProperty",
    "ApiPropertyOptional",
    "ApiHideProperty",
    "ApiResponseProperty",
    // NestJS
    "Inject",
    "Injectable",
    "Optional",
    // Sequelize
    "Table",
    "Model",
    "HasMany",
    "HasOne",
    "BelongsTo",
    "BelongsToMany",
    "ForeignKey",
    "AutoIncrement",
    "AllowNull",
    "Default",
    "PrimaryKey",
    "DataType",
    // MobX
    "observable",
    "computed",
    "action",
    "makeObservable",
    "makeAutoObservable",
    // Angular
    "Input",
    "Output",
    "ViewChild",
    "ViewChildren",
    "ContentChild",
    "ContentChildren",
    "HostBinding",
    "HostListener",
];

/// Decides which symbols are skipped because of their decorators
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    markers: HashSet<String>,
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDE_DECORATORS.iter().copied())
    }
}

impl ExclusionFilter {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    /// Replace the active marker set
    pub fn set_exclusion_markers<I, S>(&mut self, markers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.markers = markers.into_iter().map(Into::into).collect();
    }

    /// Extend the active marker set
    pub fn add_exclusion_markers<I, S>(&mut self, markers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.markers.extend(markers.into_iter().map(Into::into));
    }

    /// True when at least one of the symbol's markers is in the active set
    pub fn should_exclude(&self, symbol: &Symbol) -> bool {
        symbol.markers.iter().any(|m| self.markers.contains(m))
    }

    pub fn filter_analyzable(&self, symbols: Vec<Symbol>) -> Vec<Symbol> {
        symbols
            .into_iter()
            .filter(|s| !self.should_exclude(s))
            .collect()
    }

    pub fn is_excluded_marker(&self, marker: &str) -> bool {
        self.markers.contains(marker)
    }

    /// Sorted snapshot of the active marker set
    pub fn exclusion_markers(&self) -> Vec<String> {
        let mut markers: Vec<String> = self.markers.iter().cloned().collect();
        markers.sort();
        markers
    }
}
